//! Violation analytics over a batch of attendance records.
//!
//! The caller must pick which verdict to count: the raw machine verdict or
//! the adjudicated one after accepted disputes. There is no default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::RecordView;
use crate::types::DbId;
use crate::verdict::AttendanceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictView {
    /// Sensor evidence only, ignoring dispute outcomes.
    Raw,
    /// After accepted disputes are applied.
    Adjudicated,
}

impl VerdictView {
    fn status_of(&self, record: &RecordView) -> AttendanceStatus {
        match self {
            Self::Raw => record.machine_status,
            Self::Adjudicated => record.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherViolations {
    pub teacher_id: DbId,
    pub violations: u32,
    pub total: u32,
    pub violation_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectViolations {
    pub subject: String,
    pub violations: u32,
    pub total: u32,
    pub violation_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationSummary {
    pub view: VerdictView,
    /// Records with a terminal status. Percentages are relative to this.
    pub total: u32,
    /// Records still inside their window; excluded from `total`.
    pub pending: u32,
    pub confirmed: u32,
    pub mismatch: u32,
    pub absent: u32,
    pub confirmed_percentage: u32,
    pub mismatch_percentage: u32,
    pub absent_percentage: u32,
    /// Every teacher with at least one terminal record, by teacher id.
    pub by_teacher: Vec<TeacherViolations>,
    /// Every subject with at least one terminal record, most violations first.
    pub by_subject: Vec<SubjectViolations>,
    /// Teachers with violations, most first, ties by teacher id.
    pub top_violators: Vec<TeacherViolations>,
}

/// `round(count / total * 100)`, or 0 when there is nothing to divide by.
pub fn percentage(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(count) / f64::from(total) * 100.0).round() as u32
}

#[derive(Default)]
struct Tally {
    violations: u32,
    total: u32,
}

impl Tally {
    fn add(&mut self, status: AttendanceStatus) {
        self.total += 1;
        if status.is_violation() {
            self.violations += 1;
        }
    }
}

/// Aggregate `records` under the chosen verdict view.
///
/// Output ordering never depends on input order.
pub fn summarize(records: &[RecordView], view: VerdictView, top_limit: usize) -> ViolationSummary {
    let mut pending = 0;
    let mut confirmed = 0;
    let mut mismatch = 0;
    let mut absent = 0;
    let mut teachers: BTreeMap<DbId, Tally> = BTreeMap::new();
    let mut subjects: BTreeMap<&str, Tally> = BTreeMap::new();

    for record in records {
        let status = view.status_of(record);
        match status {
            AttendanceStatus::Pending => {
                pending += 1;
                continue;
            }
            AttendanceStatus::Confirmed => confirmed += 1,
            AttendanceStatus::Mismatch => mismatch += 1,
            AttendanceStatus::Absent => absent += 1,
        }
        teachers
            .entry(record.occurrence.teacher_id)
            .or_default()
            .add(status);
        subjects
            .entry(record.occurrence.subject.as_str())
            .or_default()
            .add(status);
    }

    let total = confirmed + mismatch + absent;

    let by_teacher: Vec<TeacherViolations> = teachers
        .into_iter()
        .map(|(teacher_id, t)| TeacherViolations {
            teacher_id,
            violations: t.violations,
            total: t.total,
            violation_percentage: percentage(t.violations, t.total),
        })
        .collect();

    let mut by_subject: Vec<SubjectViolations> = subjects
        .into_iter()
        .map(|(subject, t)| SubjectViolations {
            subject: subject.to_string(),
            violations: t.violations,
            total: t.total,
            violation_percentage: percentage(t.violations, t.total),
        })
        .collect();
    by_subject.sort_by(|a, b| {
        b.violations
            .cmp(&a.violations)
            .then_with(|| a.subject.cmp(&b.subject))
    });

    let mut top_violators: Vec<TeacherViolations> = by_teacher
        .iter()
        .filter(|t| t.violations > 0)
        .cloned()
        .collect();
    top_violators.sort_by(|a, b| {
        b.violations
            .cmp(&a.violations)
            .then_with(|| a.teacher_id.cmp(&b.teacher_id))
    });
    top_violators.truncate(top_limit);

    ViolationSummary {
        view,
        total,
        pending,
        confirmed,
        mismatch,
        absent,
        confirmed_percentage: percentage(confirmed, total),
        mismatch_percentage: percentage(mismatch, total),
        absent_percentage: percentage(absent, total),
        by_teacher,
        by_subject,
        top_violators,
    }
}

//! Lesson occurrences as delivered by the external scheduling system.
//!
//! Occurrences are immutable once registered. Times are wall-clock in the
//! schedule's local zone and are always combined with the calendar date before
//! any arithmetic, so a lesson near midnight never wraps onto the wrong day.

use chrono::{Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, OccurrenceId, Timestamp};

/// Maximum length for subject and room labels.
pub const MAX_LABEL_LENGTH: usize = 200;

/// Calendar days that must be representable before an occurrence's date.
/// Covers the widest UTC offset plus the largest pre-start offset.
const DAYS_BEFORE_MARGIN: u64 = 2;

/// Calendar days that must be representable after an occurrence's date:
/// a lesson past midnight, the widest UTC offset and the largest post-start
/// offset.
const DAYS_AFTER_MARGIN: u64 = 3;

/// One concrete scheduled lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonOccurrence {
    pub id: OccurrenceId,
    pub teacher_id: DbId,
    pub subject: String,
    pub room: String,
    pub date: NaiveDate,
    pub starts_at: NaiveTime,
    /// An end earlier than the start means the lesson runs past midnight.
    pub ends_at: NaiveTime,
}

impl LessonOccurrence {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.subject.trim().is_empty() {
            return Err(CoreError::Validation(
                "Occurrence subject must not be empty".to_string(),
            ));
        }
        if self.subject.chars().count() > MAX_LABEL_LENGTH
            || self.room.chars().count() > MAX_LABEL_LENGTH
        {
            return Err(CoreError::Validation(format!(
                "Subject and room must not exceed {MAX_LABEL_LENGTH} characters"
            )));
        }
        if self.starts_at == self.ends_at {
            return Err(CoreError::Validation(format!(
                "Occurrence {} has zero length (starts and ends at {})",
                self.id, self.starts_at
            )));
        }
        let representable = self.date.checked_sub_days(Days::new(DAYS_BEFORE_MARGIN)).is_some()
            && self.date.checked_add_days(Days::new(DAYS_AFTER_MARGIN)).is_some();
        if !representable {
            return Err(CoreError::Validation(format!(
                "Occurrence {} date {} is outside the supported calendar range",
                self.id, self.date
            )));
        }
        Ok(())
    }

    /// Local date and time of the scheduled start.
    pub fn local_start(&self) -> NaiveDateTime {
        self.date.and_time(self.starts_at)
    }

    /// Local date and time of the scheduled end, rolled to the next day when
    /// the lesson crosses midnight.
    pub fn local_end(&self) -> Result<NaiveDateTime, CoreError> {
        let end = self.date.and_time(self.ends_at);
        if self.ends_at < self.starts_at {
            end.checked_add_days(Days::new(1))
                .ok_or_else(|| self.out_of_range())
        } else {
            Ok(end)
        }
    }

    /// Scheduled start as a UTC instant.
    pub fn scheduled_start(&self, utc_offset: FixedOffset) -> Result<Timestamp, CoreError> {
        to_utc(self.local_start(), utc_offset).ok_or_else(|| self.out_of_range())
    }

    pub fn scheduled_end(&self, utc_offset: FixedOffset) -> Result<Timestamp, CoreError> {
        to_utc(self.local_end()?, utc_offset).ok_or_else(|| self.out_of_range())
    }

    pub(crate) fn out_of_range(&self) -> CoreError {
        CoreError::Validation(format!(
            "Occurrence {} on {} cannot be placed on the UTC timeline",
            self.id, self.date
        ))
    }
}

fn to_utc(local: NaiveDateTime, utc_offset: FixedOffset) -> Option<Timestamp> {
    local
        .checked_sub_signed(Duration::seconds(i64::from(utc_offset.local_minus_utc())))
        .map(|utc| utc.and_utc())
}

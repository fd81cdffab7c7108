//! Check-in window arithmetic.
//!
//! A window is the half-open interval `[opens_at, closes_at)` around the
//! scheduled start. All functions here are pure; callers pass `now` from the
//! shared [`Clock`](crate::clock::Clock).

use chrono::{Duration, FixedOffset};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{CoreError, WindowError};
use crate::schedule::LessonOccurrence;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInWindow {
    pub opens_at: Timestamp,
    pub closes_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    TooEarly,
    Open,
    TooLate,
}

/// Compute the check-in window for an occurrence.
///
/// `pre_offset` and `post_offset` are expected to be positive; [`EngineConfig`]
/// guarantees this at load time. Fails with [`CoreError::Validation`] when a
/// bound falls outside the representable timeline.
pub fn window(
    occurrence: &LessonOccurrence,
    pre_offset: Duration,
    post_offset: Duration,
    utc_offset: FixedOffset,
) -> Result<CheckInWindow, CoreError> {
    let start = occurrence.scheduled_start(utc_offset)?;
    let opens_at = start
        .checked_sub_signed(pre_offset)
        .ok_or_else(|| occurrence.out_of_range())?;
    let closes_at = start
        .checked_add_signed(post_offset)
        .ok_or_else(|| occurrence.out_of_range())?;
    Ok(CheckInWindow {
        opens_at,
        closes_at,
    })
}

/// Window for an occurrence using the configured offsets.
pub fn window_for(
    occurrence: &LessonOccurrence,
    config: &EngineConfig,
) -> Result<CheckInWindow, CoreError> {
    window(occurrence, config.pre_offset, config.post_offset, config.utc_offset)
}

impl CheckInWindow {
    pub fn status(&self, now: Timestamp) -> WindowStatus {
        if now < self.opens_at {
            WindowStatus::TooEarly
        } else if now < self.closes_at {
            WindowStatus::Open
        } else {
            WindowStatus::TooLate
        }
    }

    /// Signed distance to the next boundary.
    ///
    /// Before opening: time until `opens_at`. While open: time left until
    /// `closes_at`. After closing: negative time elapsed since `closes_at`.
    pub fn remaining(&self, now: Timestamp) -> Duration {
        match self.status(now) {
            WindowStatus::TooEarly => self.opens_at - now,
            WindowStatus::Open | WindowStatus::TooLate => self.closes_at - now,
        }
    }

    pub fn has_closed(&self, now: Timestamp) -> bool {
        self.status(now) == WindowStatus::TooLate
    }

    pub fn length(&self) -> Duration {
        self.closes_at - self.opens_at
    }

    /// `Ok(())` when `now` is inside the window, otherwise the matching
    /// [`WindowError`].
    pub fn check(&self, now: Timestamp) -> Result<(), WindowError> {
        match self.status(now) {
            WindowStatus::Open => Ok(()),
            WindowStatus::TooEarly => Err(WindowError::TooEarly {
                opens_in_secs: (self.opens_at - now).num_seconds(),
            }),
            WindowStatus::TooLate => Err(WindowError::TooClosed {
                closed_secs_ago: (now - self.closes_at).num_seconds(),
            }),
        }
    }
}

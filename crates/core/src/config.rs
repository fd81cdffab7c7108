//! Engine configuration: check-in window offsets, dispute limits, and
//! analytics defaults.
//!
//! Validation happens once at load time. A configuration that would produce a
//! zero-length or inverted window never reaches request handling.

use chrono::{Duration, FixedOffset, Offset, Utc};

use crate::error::CoreError;

/// Default minutes before the scheduled start that check-in opens.
pub const DEFAULT_PRE_OFFSET_MINUTES: i64 = 10;

/// Default minutes after the scheduled start that check-in closes.
pub const DEFAULT_POST_OFFSET_MINUTES: i64 = 5;

/// Upper bound for either window offset. Occurrence date validation assumes
/// no window reaches further than this from the scheduled start.
pub const MAX_OFFSET_MINUTES: i64 = 12 * 60;

/// Minimum dispute description length. Matches the floor enforced by clients.
pub const DEFAULT_MIN_DESCRIPTION_LEN: usize = 20;

/// Maximum dispute description length.
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 5_000;

/// Maximum attachments per dispute.
pub const DEFAULT_MAX_ATTACHMENTS: usize = 10;

/// Default length of the ranked top-violators list.
pub const DEFAULT_TOP_VIOLATORS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long before the scheduled start check-in opens.
    pub pre_offset: Duration,
    /// How long after the scheduled start check-in stays open.
    pub post_offset: Duration,
    /// Offset of the schedule's local wall-clock time from UTC.
    pub utc_offset: FixedOffset,
    pub min_description_len: usize,
    pub max_description_len: usize,
    pub max_attachments: usize,
    pub top_violators_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pre_offset: Duration::minutes(DEFAULT_PRE_OFFSET_MINUTES),
            post_offset: Duration::minutes(DEFAULT_POST_OFFSET_MINUTES),
            utc_offset: Utc.fix(),
            min_description_len: DEFAULT_MIN_DESCRIPTION_LEN,
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
            top_violators_limit: DEFAULT_TOP_VIOLATORS_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `CHECKIN_PRE_OFFSET_MINUTES`   | `10`    |
    /// | `CHECKIN_POST_OFFSET_MINUTES`  | `5`     |
    /// | `SCHEDULE_UTC_OFFSET_MINUTES`  | `0`     |
    /// | `DISPUTE_MIN_DESCRIPTION_LEN`  | `20`    |
    /// | `DISPUTE_MAX_ATTACHMENTS`      | `10`    |
    /// | `TOP_VIOLATORS_LIMIT`          | `10`    |
    ///
    /// The result is validated before it is returned.
    pub fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();

        let pre_offset = offset_minutes(
            "CHECKIN_PRE_OFFSET_MINUTES",
            env_or("CHECKIN_PRE_OFFSET_MINUTES", DEFAULT_PRE_OFFSET_MINUTES)?,
        )?;
        let post_offset = offset_minutes(
            "CHECKIN_POST_OFFSET_MINUTES",
            env_or("CHECKIN_POST_OFFSET_MINUTES", DEFAULT_POST_OFFSET_MINUTES)?,
        )?;
        let utc_offset_minutes: i32 = env_or("SCHEDULE_UTC_OFFSET_MINUTES", 0)?;

        let utc_offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            CoreError::Config(format!(
                "SCHEDULE_UTC_OFFSET_MINUTES out of range: {utc_offset_minutes}"
            ))
        })?;

        let config = Self {
            pre_offset,
            post_offset,
            utc_offset,
            min_description_len: env_or("DISPUTE_MIN_DESCRIPTION_LEN", defaults.min_description_len)?,
            max_description_len: defaults.max_description_len,
            max_attachments: env_or("DISPUTE_MAX_ATTACHMENTS", defaults.max_attachments)?,
            top_violators_limit: env_or("TOP_VIOLATORS_LIMIT", defaults.top_violators_limit)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break window or dispute invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pre_offset <= Duration::zero() {
            return Err(CoreError::Config(format!(
                "Pre-start offset must be positive, got {} minutes",
                self.pre_offset.num_minutes()
            )));
        }
        if self.post_offset <= Duration::zero() {
            return Err(CoreError::Config(format!(
                "Post-start offset must be positive, got {} minutes",
                self.post_offset.num_minutes()
            )));
        }
        let cap = Duration::minutes(MAX_OFFSET_MINUTES);
        if self.pre_offset > cap || self.post_offset > cap {
            return Err(CoreError::Config(format!(
                "Window offsets must not exceed {MAX_OFFSET_MINUTES} minutes, got {} before and {} after",
                self.pre_offset.num_minutes(),
                self.post_offset.num_minutes()
            )));
        }
        if self.min_description_len == 0 {
            return Err(CoreError::Config(
                "Minimum dispute description length must be at least 1".to_string(),
            ));
        }
        if self.max_description_len < self.min_description_len {
            return Err(CoreError::Config(format!(
                "Maximum description length ({}) is below the minimum ({})",
                self.max_description_len, self.min_description_len
            )));
        }
        if self.top_violators_limit == 0 {
            return Err(CoreError::Config(
                "Top violators limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Total length of every check-in window under this configuration.
    pub fn window_length(&self) -> Duration {
        self.pre_offset + self.post_offset
    }
}

fn offset_minutes(key: &str, minutes: i64) -> Result<Duration, CoreError> {
    Duration::try_minutes(minutes)
        .ok_or_else(|| CoreError::Config(format!("{key} is out of range: {minutes}")))
}

fn env_or<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CoreError::Config(format!("{key} is invalid ('{raw}'): {e}"))),
        Err(_) => Ok(default),
    }
}

/// Identifiers handed to us by the scheduling system (teachers, lessons, reviewers).
pub type DbId = i64;

/// Occurrences are keyed by the scheduling system's lesson-slot id.
pub type OccurrenceId = DbId;

/// Disputes are minted by the engine itself.
pub type DisputeId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub mod analytics;
pub mod check_in;
pub mod disputes;
pub mod occurrences;
pub mod records;

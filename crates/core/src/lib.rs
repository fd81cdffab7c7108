//! Attendance integrity engine.
//!
//! Decides whether a lesson check-in counts, using two independent signals
//! (QR scan and biometric confirmation) inside a fixed time window, lets the
//! teacher contest a non-confirmed verdict, and aggregates violations for
//! reporting. No I/O happens here; callers own storage and transport.

pub mod analytics;
pub mod clock;
pub mod config;
pub mod dispute;
pub mod engine;
pub mod error;
pub mod record;
pub mod schedule;
pub mod signal;
pub mod time_window;
pub mod types;
pub mod verdict;

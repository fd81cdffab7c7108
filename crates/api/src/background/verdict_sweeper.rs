//! Periodic verdict settlement and retention.
//!
//! Records are also settled lazily on read, so the sweeper only bounds how
//! long a closed window can sit without a stored verdict when nobody asks
//! for it. With a retention period set, each pass also evicts settled records
//! older than that many days.

use std::sync::Arc;
use std::time::Duration;

use attendance_core::engine::AttendanceEngine;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(
    engine: Arc<AttendanceEngine>,
    every: Duration,
    retention_days: Option<u64>,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = every.as_secs(),
        retention_days = ?retention_days,
        "Verdict sweeper started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Verdict sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let settled = engine.settle_due().await;
                if settled > 0 {
                    tracing::info!(settled, "Verdict sweep: settled closed windows");
                } else {
                    tracing::debug!("Verdict sweep: nothing to settle");
                }
                if let Some(days) = retention_days {
                    engine.evict_expired(days).await;
                }
            }
        }
    }
}

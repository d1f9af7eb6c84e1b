//! Background driver for the periodic archival sweep.
//!
//! The external trigger of the archival engine: a plain `tokio` interval
//! task standing in for the daily cron. The manual REST trigger invokes
//! the same [`ArchiveService::archive_expired`] procedure.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::ArchiveService;

/// Minimum interval between sweeps, guarding against misconfiguration.
const MIN_INTERVAL_SECS: u64 = 60;

/// Spawns the recurring sweep task. The first sweep runs one full
/// interval after startup, not immediately.
pub fn spawn_sweep(archive: ArchiveService, interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(interval_secs.max(MIN_INTERVAL_SECS));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the sweep
        // does not race startup.
        interval.tick().await;

        loop {
            interval.tick().await;
            let started = std::time::Instant::now();
            match archive.archive_expired(Utc::now()).await {
                Ok(report) => {
                    tracing::info!(
                        deleted_events = report.deleted_events,
                        archived_events = report.archived_events,
                        successful_events = report.successful_events,
                        updated_communities = report.updated_communities,
                        updated_venues = report.updated_venues,
                        warnings = report.warnings.len(),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "scheduled archival sweep finished"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "scheduled archival sweep failed"
                    );
                }
            }
        }
    })
}

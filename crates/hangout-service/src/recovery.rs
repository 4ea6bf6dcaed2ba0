//! Re-attaches coordinators to events that were in flight when the process stopped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hangout_core::model::Event;

use crate::error::ServiceResult;
use crate::runtime::{CoordinatorRuntime, StartOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub scanned: usize,
    pub started: usize,
    pub already_running: usize,
    /// Held by another holder. Each gets a lease retry.
    pub claimed_elsewhere: usize,
    /// Unpopulated, finalized, or already past the earliest date.
    pub skipped: usize,
    pub failed: usize,
}

/// Populated, not finalized, and still before its earliest date.
#[must_use]
pub fn is_resumable(event: &Event, now: DateTime<Utc>) -> bool {
    !event.phase.is_terminal()
        && event
            .details()
            .is_some_and(|details| now < details.earliest_date)
}

/// ## Summary
/// Scans every stored event and starts a coordinator for each resumable one. Safe to run
/// repeatedly: events that already have a coordinator are left alone. Events leased by
/// another holder are retried once that lease can have lapsed, so a node that died
/// without releasing does not strand its events.
///
/// ## Errors
/// Returns an error if the event list cannot be read. Failures to start individual
/// coordinators are counted in the report.
#[tracing::instrument(skip(runtime))]
pub async fn recover(runtime: &Arc<CoordinatorRuntime>) -> ServiceResult<RecoveryReport> {
    let events = runtime.context().store.list_all_events().await?;
    let now = Utc::now();
    let mut report = RecoveryReport {
        scanned: events.len(),
        ..RecoveryReport::default()
    };

    for event in events {
        if !is_resumable(&event, now) {
            report.skipped += 1;
            continue;
        }
        match runtime.start(event.id.clone()).await {
            Ok(StartOutcome::Started) => report.started += 1,
            Ok(StartOutcome::AlreadyRunning) => report.already_running += 1,
            Ok(StartOutcome::ClaimedElsewhere) => {
                report.claimed_elsewhere += 1;
                runtime.retry_when_lease_lapses(event.id.clone()).await;
            }
            Ok(StartOutcome::ShuttingDown) => break,
            Err(error) => {
                tracing::error!(event_id = %event.id, %error, "Failed to resume event");
                report.failed += 1;
            }
        }
    }

    tracing::info!(?report, "Recovery scan complete");
    Ok(report)
}

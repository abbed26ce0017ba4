//! Periodic deadline check.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::notifier::Notifier;
use crate::service::TripService;
use crate::store::TripStore;

/// Check for overdue trips every `every` until `shutdown` fires.
///
/// The first check runs immediately. A failed check is logged and retried on
/// the next tick.
pub async fn run_deadline_watcher<S, N>(
    service: Arc<TripService<S, N>>,
    every: Duration,
    shutdown: CancellationToken,
) where
    S: TripStore,
    N: Notifier,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = every.as_secs(), "Deadline watcher started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match service.dispatch_overdue_alerts(Utc::now()).await {
            Ok(reports) if !reports.is_empty() => {
                let delivered: usize = reports.iter().map(|r| r.delivered).sum();
                info!(trips = reports.len(), delivered, "Overdue alerts dispatched");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Deadline check failed"),
        }
    }

    info!("Deadline watcher stopped");
}

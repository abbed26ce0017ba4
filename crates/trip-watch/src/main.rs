//! Trip watch service.
//!
//! Runs the overdue-deadline watcher until Ctrl-C, over the in-memory store
//! and the logging notifier. Deployments with a database or an SMS gateway
//! embed [`TripService`] with their own [`trip_watch::TripStore`] and
//! [`trip_watch::Notifier`] instead.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use trip_watch::{
    init_logging, run_deadline_watcher, LogNotifier, MemoryStore, TripService, WatchConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WatchConfig::load()?;
    init_logging(&config)?;

    info!(
        timezone = config.timezone.name(),
        check_interval_secs = config.deadline_check_interval.as_secs(),
        extension_hours = config.extension_hours,
        "Starting trip watch service"
    );

    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(LogNotifier::new());
    let service = Arc::new(TripService::new(store, notifier, config.clone()));

    let shutdown = CancellationToken::new();
    let watcher = tokio::spawn(run_deadline_watcher(
        Arc::clone(&service),
        config.deadline_check_interval,
        shutdown.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    shutdown.cancel();
    service.shutdown();
    watcher.await?;

    Ok(())
}

//! # trip-watch
//!
//! Service layer for trip safety tracking, built on [`trip_clock`].
//!
//! Storage, SMS delivery and geolocation are external; they plug in through
//! [`TripStore`], [`Notifier`] and [`LocationSource`]. This crate owns the
//! trip lifecycle, the per-trip location timers, and the watcher that alerts
//! contacts when a trip passes its deadline.
//!
//! ## Modules
//!
//! - [`config`] — environment-driven configuration
//! - [`service`] — start, extend, end, status, alerts
//! - [`scheduler`] — cancellable periodic timers keyed by trip id
//! - [`policy`] — weak/strong signal interval policy
//! - [`watcher`] — periodic overdue check
//! - [`store`], [`notifier`], [`location`] — external collaborator seams
//! - [`logging`] — tracing subscriber setup
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod notifier;
pub mod policy;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod watcher;

pub use config::{LogFormat, WatchConfig};
pub use error::WatchError;
pub use location::{LocationSource, Position};
pub use logging::init_logging;
pub use notifier::{Delivery, LogNotifier, Notifier};
pub use policy::{IntervalPolicy, NetworkInfo, SignalStrength};
pub use scheduler::TaskScheduler;
pub use service::{AlertReport, TripService, TripStatus};
pub use store::{MemoryStore, TripStore};
pub use watcher::run_deadline_watcher;

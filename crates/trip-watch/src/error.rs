//! Error types for the trip service layer.

use thiserror::Error;
use trip_clock::{TripClockError, TripId};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    #[error("Profile not found: {0}")]
    ProfileNotFound(u64),

    #[error(transparent)]
    Clock(#[from] TripClockError),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WatchError>;

//! Error types for trip-clock operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TripClockError {
    #[error("Invalid slot code: {0}")]
    InvalidSlotCode(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Trip has no selected contacts")]
    NoContacts,

    #[error("Trip {0} is not active")]
    TripInactive(u64),
}

pub type Result<T> = std::result::Result<T, TripClockError>;

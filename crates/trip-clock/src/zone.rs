//! Binding naive wall-clock deadlines to an explicit timezone.
//!
//! The engine computes deadlines as naive local values. Callers that hold a
//! UTC clock (servers) convert "now" into the trip's wall clock with
//! [`wall_clock`], and convert a deadline back into an instant with
//! [`localize`], so that client and server agree by configuration.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::TripClockError;

/// Parse an IANA timezone name.
pub fn parse_timezone(s: &str) -> Result<Tz, TripClockError> {
    s.parse::<Tz>()
        .map_err(|_| TripClockError::InvalidTimezone(format!("'{s}'")))
}

/// The wall-clock reading in `tz` at the instant `now`.
pub fn wall_clock(now: DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    now.with_timezone(tz).naive_local()
}

/// Interpret a naive wall-clock value in `tz`.
///
/// An ambiguous local time (DST fall-back) resolves to the earlier instant.
///
/// # Errors
///
/// [`TripClockError::InvalidDatetime`] if the local time does not exist in
/// `tz` (DST spring-forward gap).
pub fn localize(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Tz>, TripClockError> {
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        TripClockError::InvalidDatetime(format!(
            "'{naive}' does not exist in {}",
            tz.name()
        ))
    })
}

//! Deadline calculator: return date + slot → absolute deadline.
//!
//! Deadlines are naive wall-clock values. No timezone conversion happens here;
//! use [`crate::zone`] to bind a deadline to an explicit zone.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::TripClockError;
use crate::slot::{slot_to_boundary, TimeSlotCode};

/// Wire format for return dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Compute the deadline for a return date and slot.
///
/// Midnight of `return_date`, moved to the slot's boundary hour, plus one day
/// for `PM_late`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use trip_clock::deadline::compute_deadline;
/// use trip_clock::slot::TimeSlotCode;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let deadline = compute_deadline(date, TimeSlotCode::PM_LATE);
/// assert_eq!(deadline.to_string(), "2024-06-16 00:00:00");
/// ```
pub fn compute_deadline(return_date: NaiveDate, slot: TimeSlotCode) -> NaiveDateTime {
    let boundary = slot_to_boundary(slot);
    at_boundary(return_date, boundary.hour, boundary.day_offset)
}

/// Like [`compute_deadline`], parsing a `YYYY-MM-DD` date and a slot literal.
///
/// # Errors
///
/// [`TripClockError::InvalidDate`] for a malformed date,
/// [`TripClockError::InvalidSlotCode`] for an unknown slot.
pub fn compute_deadline_str(return_date: &str, slot: &str) -> Result<NaiveDateTime, TripClockError> {
    let date = parse_date(return_date)?;
    let slot: TimeSlotCode = slot.parse()?;
    Ok(compute_deadline(date, slot))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TripClockError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| TripClockError::InvalidDate(format!("'{s}': {e}")))
}

/// Parse a naive datetime, accepting `YYYY-MM-DDTHH:MM:SS` or a space separator.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, TripClockError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| TripClockError::InvalidDatetime(format!("'{s}': {e}")))
}

/// `date` at `hour:00:00.000`, plus `day_offset` days.
pub(crate) fn at_boundary(date: NaiveDate, hour: u32, day_offset: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    // Saturates at the end of chrono's supported range.
    let date = date
        .checked_add_days(Days::new(u64::from(day_offset)))
        .unwrap_or(date);
    date.and_time(time)
}

// ── Tests ───────────────────────────────────────────────────────────────────

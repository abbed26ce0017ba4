//! Countdown tracker: remaining time and trip progress.
//!
//! A pure function of three instants (`now`, the deadline, the trip start).
//! It is re-evaluated on every display tick, so it does no I/O and never
//! fails: a passed deadline is a negative `remaining`, and a trip window of
//! zero or negative length has zero progress.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

/// Label shown instead of a time once the deadline has passed.
pub const EXPIRED_LABEL: &str = "expired";

/// Snapshot of a trip's countdown at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    /// `deadline - now`. Negative once the deadline has passed.
    #[serde(serialize_with = "serialize_seconds")]
    pub remaining: TimeDelta,
    /// `deadline - trip_start`.
    #[serde(serialize_with = "serialize_seconds")]
    pub total_duration: TimeDelta,
    /// Share of the trip window consumed, in `[0, 1]`.
    pub elapsed_fraction: f64,
}

impl Countdown {
    /// Whether the deadline has been reached.
    pub fn is_expired(&self) -> bool {
        self.remaining <= TimeDelta::zero()
    }

    /// Elapsed fraction as a whole percentage, 0..=100.
    pub fn progress_percent(&self) -> u8 {
        (self.elapsed_fraction * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Human-readable remaining time (see [`format_remaining`]).
    pub fn label(&self) -> String {
        format_remaining(self.remaining)
    }
}

/// Compute the countdown for a trip.
///
/// # Examples
///
/// ```
/// use trip_clock::countdown::countdown;
/// use trip_clock::deadline::parse_datetime;
///
/// let c = countdown(
///     parse_datetime("2024-06-14T18:00:00").unwrap(),
///     parse_datetime("2024-06-15T06:00:00").unwrap(),
///     parse_datetime("2024-06-14T06:00:00").unwrap(),
/// );
/// assert_eq!(c.remaining.num_hours(), 12);
/// assert_eq!(c.elapsed_fraction, 0.5);
/// ```
pub fn countdown(now: NaiveDateTime, deadline: NaiveDateTime, trip_start: NaiveDateTime) -> Countdown {
    let remaining = deadline - now;
    let total_duration = deadline - trip_start;
    Countdown {
        remaining,
        total_duration,
        elapsed_fraction: elapsed_fraction(remaining, total_duration),
    }
}

fn elapsed_fraction(remaining: TimeDelta, total: TimeDelta) -> f64 {
    if total <= TimeDelta::zero() {
        return 0.0;
    }
    let total_ms = total.num_milliseconds() as f64;
    let elapsed_ms = (total - remaining).num_milliseconds() as f64;
    (elapsed_ms / total_ms).clamp(0.0, 1.0)
}

/// Render remaining time as whole hours and minutes, dropping seconds.
///
/// Anything at or below zero renders as [`EXPIRED_LABEL`], never as a
/// negative number.
pub fn format_remaining(remaining: TimeDelta) -> String {
    if remaining <= TimeDelta::zero() {
        return EXPIRED_LABEL.to_string();
    }

    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    let minutes_part = format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" });

    if hours > 0 {
        format!(
            "{} hour{}, {}",
            hours,
            if hours == 1 { "" } else { "s" },
            minutes_part
        )
    } else {
        minutes_part
    }
}

fn serialize_seconds<S: serde::Serializer>(d: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

// ── Tests ───────────────────────────────────────────────────────────────────

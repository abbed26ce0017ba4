//! Slot codec: coarse return-time buckets and their boundary hours.
//!
//! A user picks the return window as one of four slots. Each slot names the
//! hour at which its six-hour window *ends*, not a range:
//!
//! | code       | window          | boundary            |
//! |------------|-----------------|---------------------|
//! | `AM_early` | 00:00 – 06:00   | 06:00               |
//! | `AM_late`  | 06:00 – 12:00   | 12:00               |
//! | `PM_early` | 12:00 – 18:00   | 18:00               |
//! | `PM_late`  | 18:00 – 24:00   | 00:00 the next day  |
//!
//! [`slot_to_boundary`] is the forward lookup and [`hour_to_slot`] classifies
//! an arbitrary hour back into the slot whose window contains it.
//!
//! # Boundaries are not fixed points
//!
//! A boundary hour is the *first* hour of the following window, so
//! `hour_to_slot(slot_to_boundary(c).hour)` never returns `c`. For example the
//! `AM_early` boundary (06:00) classifies as `AM_late`. Extension relies on
//! this: a shifted deadline that lands exactly on a boundary snaps forward to
//! the next one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TripClockError;

/// Half of the day a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Am,
    Pm,
}

/// First or second six hours of a [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Early,
    Late,
}

/// One of the four coarse return-time slots.
///
/// Serialized as `"<AM|PM>_<early|late>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlotCode {
    pub period: Period,
    pub segment: Segment,
}

impl TimeSlotCode {
    pub const AM_EARLY: TimeSlotCode = TimeSlotCode::new(Period::Am, Segment::Early);
    pub const AM_LATE: TimeSlotCode = TimeSlotCode::new(Period::Am, Segment::Late);
    pub const PM_EARLY: TimeSlotCode = TimeSlotCode::new(Period::Pm, Segment::Early);
    pub const PM_LATE: TimeSlotCode = TimeSlotCode::new(Period::Pm, Segment::Late);

    /// All codes in chronological order of their windows.
    pub const ALL: [TimeSlotCode; 4] = [
        TimeSlotCode::AM_EARLY,
        TimeSlotCode::AM_LATE,
        TimeSlotCode::PM_EARLY,
        TimeSlotCode::PM_LATE,
    ];

    pub const fn new(period: Period, segment: Segment) -> Self {
        Self { period, segment }
    }

    /// The wire literal for this code.
    pub fn as_str(&self) -> &'static str {
        match (self.period, self.segment) {
            (Period::Am, Segment::Early) => "AM_early",
            (Period::Am, Segment::Late) => "AM_late",
            (Period::Pm, Segment::Early) => "PM_early",
            (Period::Pm, Segment::Late) => "PM_late",
        }
    }
}

impl fmt::Display for TimeSlotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlotCode {
    type Err = TripClockError;

    /// Parse one of the four literals. Matching is exact: no trimming, no
    /// case folding, and no fallback slot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (period, segment) = s
            .split_once('_')
            .ok_or_else(|| TripClockError::InvalidSlotCode(format!("'{s}'")))?;

        let period = match period {
            "AM" => Period::Am,
            "PM" => Period::Pm,
            _ => return Err(TripClockError::InvalidSlotCode(format!("'{s}'"))),
        };
        let segment = match segment {
            "early" => Segment::Early,
            "late" => Segment::Late,
            _ => return Err(TripClockError::InvalidSlotCode(format!("'{s}'"))),
        };

        Ok(TimeSlotCode::new(period, segment))
    }
}

impl TryFrom<String> for TimeSlotCode {
    type Error = TripClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlotCode> for String {
    fn from(code: TimeSlotCode) -> Self {
        code.as_str().to_string()
    }
}

// ── slot_to_boundary ────────────────────────────────────────────────────────

/// The hour of day at which a slot ends, and whether that hour falls on the
/// following calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotBoundary {
    /// Hour of day, 0..=23.
    pub hour: u32,
    /// 1 when the boundary is midnight of the next day, otherwise 0.
    pub day_offset: u32,
}

/// Look up the boundary of a slot.
///
/// # Examples
///
/// ```
/// use trip_clock::slot::{slot_to_boundary, TimeSlotCode};
///
/// let b = slot_to_boundary(TimeSlotCode::PM_LATE);
/// assert_eq!((b.hour, b.day_offset), (0, 1));
/// ```
pub fn slot_to_boundary(code: TimeSlotCode) -> SlotBoundary {
    let (hour, day_offset) = match (code.period, code.segment) {
        (Period::Am, Segment::Early) => (6, 0),
        (Period::Am, Segment::Late) => (12, 0),
        (Period::Pm, Segment::Early) => (18, 0),
        (Period::Pm, Segment::Late) => (0, 1),
    };
    SlotBoundary { hour, day_offset }
}

// ── hour_to_slot ────────────────────────────────────────────────────────────

/// The slot an hour of day falls into, with that slot's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotClassification {
    pub code: TimeSlotCode,
    pub boundary_hour: u32,
    pub day_offset: u32,
}

/// Classify an hour of day into the slot whose window contains it.
///
/// Windows are half-open: `[0,6)`, `[6,12)`, `[12,18)`, `[18,24)`. The input
/// is reduced modulo 24 first, so `24` and `-1` are accepted and mean `0` and
/// `23`.
///
/// # Examples
///
/// ```
/// use trip_clock::slot::{hour_to_slot, TimeSlotCode};
///
/// assert_eq!(hour_to_slot(5).code, TimeSlotCode::AM_EARLY);
/// assert_eq!(hour_to_slot(6).code, TimeSlotCode::AM_LATE);
/// assert_eq!(hour_to_slot(18).day_offset, 1);
/// ```
pub fn hour_to_slot(hour: i64) -> SlotClassification {
    let hour = hour.rem_euclid(24);
    let code = match hour {
        0..=5 => TimeSlotCode::AM_EARLY,
        6..=11 => TimeSlotCode::AM_LATE,
        12..=17 => TimeSlotCode::PM_EARLY,
        _ => TimeSlotCode::PM_LATE,
    };
    let boundary = slot_to_boundary(code);
    SlotClassification {
        code,
        boundary_hour: boundary.hour,
        day_offset: boundary.day_offset,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

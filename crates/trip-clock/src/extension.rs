//! Extension resolver: push a deadline forward and re-derive its slot.
//!
//! Deadlines are stored as `{return_date, slot}`, so an arbitrary shift has
//! to land on a slot boundary. The shifted instant is classified with
//! [`hour_to_slot`] and the deadline becomes the end of that slot's window.
//! Snapping is always forward: the new deadline is strictly after the shifted
//! instant and at most six hours past it. The time actually added can
//! therefore exceed the requested delta (05:30 + 2h lands in `AM_late` and
//! becomes 12:00, 6.5 hours later).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::deadline::at_boundary;
use crate::slot::{hour_to_slot, TimeSlotCode};

/// The fixed extension offered by the product, in hours.
pub const DEFAULT_EXTENSION_HOURS: i64 = 2;

/// A resolved extension, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Calendar date to persist as the trip's return date.
    pub return_date: NaiveDate,
    /// Slot to persist as the trip's return slot.
    pub slot: TimeSlotCode,
    /// The new deadline. Equal to `compute_deadline(return_date, slot)`.
    pub deadline: NaiveDateTime,
    /// Time actually added to the previous deadline.
    #[serde(serialize_with = "serialize_seconds")]
    pub added: TimeDelta,
}

/// Extend `current_deadline` by `delta_hours` and snap to the enclosing slot's
/// boundary.
///
/// A negative delta moves the shifted instant backward but the result still
/// snaps forward from wherever it lands.
///
/// # Examples
///
/// ```
/// use trip_clock::deadline::parse_datetime;
/// use trip_clock::extension::extend_deadline;
/// use trip_clock::slot::TimeSlotCode;
///
/// let ext = extend_deadline(parse_datetime("2024-06-15T05:30:00").unwrap(), 2);
/// assert_eq!(ext.slot, TimeSlotCode::AM_LATE);
/// assert_eq!(ext.return_date.to_string(), "2024-06-15");
/// assert_eq!(ext.added.num_minutes(), 390);
/// ```
pub fn extend_deadline(current_deadline: NaiveDateTime, delta_hours: i64) -> Extension {
    extend_deadline_by(current_deadline, TimeDelta::hours(delta_hours))
}

/// [`extend_deadline`] with an arbitrary delta.
pub fn extend_deadline_by(current_deadline: NaiveDateTime, delta: TimeDelta) -> Extension {
    let shifted = current_deadline
        .checked_add_signed(delta)
        .unwrap_or(current_deadline);
    let class = hour_to_slot(i64::from(shifted.hour()));

    // Persist the shifted instant's own date; `compute_deadline` re-applies
    // the day offset, so the stored pair reproduces `deadline`.
    let return_date = shifted.date();
    let deadline = at_boundary(return_date, class.boundary_hour, class.day_offset);

    Extension {
        return_date,
        slot: class.code,
        deadline,
        added: deadline - current_deadline,
    }
}

fn serialize_seconds<S: serde::Serializer>(d: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::{compute_deadline, parse_datetime};

    fn dt(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_hours_snaps_to_noon() {
        let ext = extend_deadline(dt("2024-06-15T05:30:00"), 2);
        assert_eq!(ext.return_date, date(2024, 6, 15));
        assert_eq!(ext.slot, TimeSlotCode::AM_LATE);
        assert_eq!(ext.deadline, dt("2024-06-15T12:00:00"));
        // 6.5 hours added, not 2.
        assert_eq!(ext.added, TimeDelta::minutes(390));
    }

    #[test]
    fn test_extension_from_boundary_skips_to_next_boundary() {
        // 10:00 + 2h = 12:00, which starts PM_early.
        let ext = extend_deadline(dt("2024-06-15T10:00:00"), 2);
        assert_eq!(ext.slot, TimeSlotCode::PM_EARLY);
        assert_eq!(ext.deadline, dt("2024-06-15T18:00:00"));
        assert_eq!(ext.added, TimeDelta::hours(8));
    }

    #[test]
    fn test_zero_delta_never_reproduces_input_boundary() {
        for code in TimeSlotCode::ALL {
            let deadline = compute_deadline(date(2024, 6, 15), code);
            let ext = extend_deadline(deadline, 0);
            assert_ne!(ext.slot, code, "{code}");
            assert_eq!(ext.deadline - deadline, TimeDelta::hours(6), "{code}");
        }
    }

    #[test]
    fn test_default_extension_of_every_slot() {
        // Every boundary + 2h lands two hours into the next window.
        let d = date(2024, 6, 15);
        let cases = [
            (TimeSlotCode::AM_EARLY, TimeSlotCode::AM_LATE, "2024-06-15T12:00:00"),
            (TimeSlotCode::AM_LATE, TimeSlotCode::PM_EARLY, "2024-06-15T18:00:00"),
            (TimeSlotCode::PM_EARLY, TimeSlotCode::PM_LATE, "2024-06-16T00:00:00"),
            (TimeSlotCode::PM_LATE, TimeSlotCode::AM_EARLY, "2024-06-16T06:00:00"),
        ];
        for (from, to, expected) in cases {
            let ext = extend_deadline(compute_deadline(d, from), DEFAULT_EXTENSION_HOURS);
            assert_eq!(ext.slot, to, "from {from}");
            assert_eq!(ext.deadline, dt(expected), "from {from}");
        }
    }

    #[test]
    fn test_pm_late_extension_persists_shifted_date() {
        // 16:30 + 2h = 18:30 → PM_late, deadline is the following midnight.
        let ext = extend_deadline(dt("2024-06-15T16:30:00"), 2);
        assert_eq!(ext.slot, TimeSlotCode::PM_LATE);
        assert_eq!(ext.return_date, date(2024, 6, 15));
        assert_eq!(ext.deadline, dt("2024-06-16T00:00:00"));
        assert_eq!(compute_deadline(ext.return_date, ext.slot), ext.deadline);
    }

    #[test]
    fn test_extension_across_midnight() {
        // 23:00 + 2h = 01:00 on the next day → AM_early on the new date.
        let ext = extend_deadline(dt("2024-12-31T23:00:00"), 2);
        assert_eq!(ext.return_date, date(2025, 1, 1));
        assert_eq!(ext.slot, TimeSlotCode::AM_EARLY);
        assert_eq!(ext.deadline, dt("2025-01-01T06:00:00"));
    }

    #[test]
    fn test_multi_day_extension() {
        let ext = extend_deadline(dt("2024-06-15T06:00:00"), 48);
        assert_eq!(ext.return_date, date(2024, 6, 17));
        assert_eq!(ext.slot, TimeSlotCode::AM_LATE);
    }

    #[test]
    fn test_negative_delta_still_snaps_forward_from_shifted() {
        let ext = extend_deadline(dt("2024-06-15T18:00:00"), -3);
        // 15:00 → PM_early → 18:00
        assert_eq!(ext.slot, TimeSlotCode::PM_EARLY);
        assert_eq!(ext.deadline, dt("2024-06-15T18:00:00"));
        assert_eq!(ext.added, TimeDelta::zero());
    }

    #[test]
    fn test_sub_hour_delta() {
        let ext = extend_deadline_by(dt("2024-06-15T05:30:00"), TimeDelta::minutes(20));
        assert_eq!(ext.slot, TimeSlotCode::AM_EARLY);
        assert_eq!(ext.deadline, dt("2024-06-15T06:00:00"));
    }

    #[test]
    fn test_serializes_for_persistence() {
        let ext = extend_deadline(dt("2024-06-15T05:30:00"), 2);
        let json = serde_json::to_value(ext).unwrap();
        assert_eq!(json["returnDate"], "2024-06-15");
        assert_eq!(json["slot"], "AM_late");
        assert_eq!(json["added"], 23_400);
    }
}

//! # trip-clock
//!
//! Return-deadline engine for trip safety tracking.
//!
//! A traveller picks a return date and one of four coarse return slots. The
//! engine turns that choice into an absolute deadline, tracks the countdown
//! to it, and resolves deadline extensions back into a `{date, slot}` pair.
//! Every function takes explicit inputs (no system clock access) and performs
//! no I/O.
//!
//! ## Modules
//!
//! - [`slot`] — slot codes ↔ boundary hours
//! - [`deadline`] — return date + slot → absolute deadline
//! - [`countdown`] — remaining time and elapsed fraction
//! - [`extension`] — push a deadline forward, snapping to a slot boundary
//! - [`zone`] — bind naive deadlines to an IANA timezone
//! - [`trip`] — the trip record and its lifecycle
//! - [`alert`] — overdue alert text and phone normalization
//! - [`error`] — Error types

pub mod alert;
pub mod countdown;
pub mod deadline;
pub mod error;
pub mod extension;
pub mod slot;
pub mod trip;
pub mod zone;

pub use alert::{compose_alert_message, format_phone_number, DEFAULT_COUNTRY_CODE};
pub use countdown::{countdown, format_remaining, Countdown, EXPIRED_LABEL};
pub use deadline::{compute_deadline, compute_deadline_str, parse_date, parse_datetime};
pub use error::TripClockError;
pub use extension::{extend_deadline, extend_deadline_by, Extension, DEFAULT_EXTENSION_HOURS};
pub use slot::{
    hour_to_slot, slot_to_boundary, Period, Segment, SlotBoundary, SlotClassification,
    TimeSlotCode,
};
pub use trip::{Contact, GeoPoint, LocationUpdate, NewTrip, Trip, TripId, UserProfile};
pub use zone::{localize, parse_timezone, wall_clock};

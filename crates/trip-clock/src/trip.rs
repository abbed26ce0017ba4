//! The trip record and its lifecycle.
//!
//! A trip holds exactly one deadline, stored as `{return_date, slot}`. It is
//! mutated only by extension (the deadline moves) or deactivation (alerts
//! stop). Storage is the caller's concern; these types only carry the state
//! and apply the engine to it.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::countdown::{countdown, Countdown};
use crate::deadline::compute_deadline;
use crate::error::TripClockError;
use crate::extension::{extend_deadline, Extension};
use crate::slot::TimeSlotCode;

pub type TripId = u64;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A tracked trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub user_profile_id: u64,
    pub destination: Option<GeoPoint>,
    pub return_date: NaiveDate,
    pub return_time_slot: TimeSlotCode,
    /// Phone numbers of the contacts to alert.
    pub selected_contact_ids: BTreeSet<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    /// When overdue alerts were sent for the current deadline.
    #[serde(default)]
    pub alerted_at: Option<NaiveDateTime>,
}

impl Trip {
    /// The absolute deadline for this trip's return date and slot.
    pub fn deadline(&self) -> NaiveDateTime {
        compute_deadline(self.return_date, self.return_time_slot)
    }

    pub fn countdown(&self, now: NaiveDateTime) -> Countdown {
        countdown(now, self.deadline(), self.created_at)
    }

    /// Active, past its deadline, and not yet alerted for this deadline.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.is_active && self.alerted_at.is_none() && self.deadline() <= now
    }

    /// Push the deadline forward by `delta_hours` and store the snapped
    /// date and slot. Clears `alerted_at` so the new deadline can alert.
    pub fn extend(&mut self, delta_hours: i64) -> Result<Extension, TripClockError> {
        if !self.is_active {
            return Err(TripClockError::TripInactive(self.id));
        }
        let ext = extend_deadline(self.deadline(), delta_hours);
        self.return_date = ext.return_date;
        self.return_time_slot = ext.slot;
        self.alerted_at = None;
        Ok(ext)
    }

    /// Stop the trip. Idempotent.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn mark_alerted(&mut self, at: NaiveDateTime) {
        self.alerted_at = Some(at);
    }
}

/// Payload for creating a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub user_profile_id: u64,
    pub destination: Option<GeoPoint>,
    pub return_date: NaiveDate,
    pub return_time_slot: TimeSlotCode,
    pub selected_contact_ids: BTreeSet<String>,
}

impl NewTrip {
    /// Build an active trip. Date and slot are stored as given, even if they
    /// resolve to a deadline before `created_at`.
    pub fn into_trip(self, id: TripId, created_at: NaiveDateTime) -> Result<Trip, TripClockError> {
        if self.selected_contact_ids.is_empty() {
            return Err(TripClockError::NoContacts);
        }
        Ok(Trip {
            id,
            user_profile_id: self.user_profile_id,
            destination: self.destination,
            return_date: self.return_date,
            return_time_slot: self.return_time_slot,
            selected_contact_ids: self.selected_contact_ids,
            is_active: true,
            created_at,
            alerted_at: None,
        })
    }
}

/// One recorded position of the traveller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub trip_id: TripId,
    pub lat: f64,
    pub lng: f64,
    /// Reported accuracy radius in metres.
    pub accuracy: Option<f64>,
    pub timestamp: NaiveDateTime,
}

impl LocationUpdate {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Age of this fix at `now`.
    pub fn age(&self, now: NaiveDateTime) -> TimeDelta {
        now - self.timestamp
    }
}

/// The traveller's profile, including the medical details contacts may need
/// to pass on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub city: String,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub chronic_diseases: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// An emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    pub user_profile_id: u64,
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::parse_datetime;

    fn dt(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn new_trip() -> NewTrip {
        NewTrip {
            user_profile_id: 7,
            destination: Some(GeoPoint {
                lat: 24.7136,
                lng: 46.6753,
            }),
            return_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            return_time_slot: TimeSlotCode::AM_EARLY,
            selected_contact_ids: BTreeSet::from(["0501234567".to_string()]),
        }
    }

    #[test]
    fn test_into_trip_stores_slot_as_is() {
        let trip = new_trip().into_trip(1, dt("2024-06-14T06:00:00")).unwrap();
        assert!(trip.is_active);
        assert_eq!(trip.return_time_slot, TimeSlotCode::AM_EARLY);
        assert_eq!(trip.deadline(), dt("2024-06-15T06:00:00"));
    }

    #[test]
    fn test_into_trip_requires_contacts() {
        let mut payload = new_trip();
        payload.selected_contact_ids.clear();
        let err = payload.into_trip(1, dt("2024-06-14T06:00:00")).unwrap_err();
        assert_eq!(err, TripClockError::NoContacts);
    }

    #[test]
    fn test_past_deadline_is_accepted() {
        let trip = new_trip().into_trip(1, dt("2024-06-16T06:00:00")).unwrap();
        assert!(trip.countdown(dt("2024-06-16T06:00:00")).is_expired());
    }

    #[test]
    fn test_countdown_through_trip() {
        let trip = new_trip().into_trip(1, dt("2024-06-14T06:00:00")).unwrap();
        let c = trip.countdown(dt("2024-06-14T18:00:00"));
        assert_eq!(c.remaining, TimeDelta::hours(12));
        assert_eq!(c.elapsed_fraction, 0.5);
    }

    #[test]
    fn test_extend_updates_date_and_slot() {
        let mut trip = new_trip().into_trip(1, dt("2024-06-14T06:00:00")).unwrap();
        trip.mark_alerted(dt("2024-06-15T06:00:10"));

        let ext = trip.extend(2).unwrap();
        assert_eq!(trip.return_time_slot, TimeSlotCode::AM_LATE);
        assert_eq!(trip.deadline(), dt("2024-06-15T12:00:00"));
        assert_eq!(trip.deadline(), ext.deadline);
        assert!(trip.alerted_at.is_none());
    }

    #[test]
    fn test_extend_inactive_trip_fails() {
        let mut trip = new_trip().into_trip(3, dt("2024-06-14T06:00:00")).unwrap();
        trip.deactivate();
        assert_eq!(trip.extend(2).unwrap_err(), TripClockError::TripInactive(3));
        assert_eq!(trip.return_time_slot, TimeSlotCode::AM_EARLY);
    }

    #[test]
    fn test_overdue_rules() {
        let mut trip = new_trip().into_trip(1, dt("2024-06-14T06:00:00")).unwrap();
        assert!(!trip.is_overdue(dt("2024-06-15T05:59:59")));
        assert!(trip.is_overdue(dt("2024-06-15T06:00:00")));

        trip.mark_alerted(dt("2024-06-15T06:00:00"));
        assert!(!trip.is_overdue(dt("2024-06-15T07:00:00")));

        let mut ended = new_trip().into_trip(2, dt("2024-06-14T06:00:00")).unwrap();
        ended.deactivate();
        assert!(!ended.is_overdue(dt("2024-06-16T00:00:00")));
    }

    #[test]
    fn test_trip_json_shape() {
        let trip = new_trip().into_trip(1, dt("2024-06-14T06:00:00")).unwrap();
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["returnDate"], "2024-06-15");
        assert_eq!(json["returnTimeSlot"], "AM_early");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["selectedContactIds"][0], "0501234567");

        let back: Trip = serde_json::from_value(json).unwrap();
        assert_eq!(back, trip);
    }

    #[test]
    fn test_trip_json_rejects_unknown_slot() {
        let mut json = serde_json::to_value(new_trip()).unwrap();
        json["returnTimeSlot"] = "PM_noon".into();
        assert!(serde_json::from_value::<NewTrip>(json).is_err());
    }

    #[test]
    fn test_profile_medical_fields_are_optional() {
        let json = serde_json::json!({
            "id": 4,
            "city": "Riyadh",
            "createdAt": "2024-06-01T10:00:00",
            "updatedAt": "2024-06-01T10:00:00",
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.city, "Riyadh");
        assert!(profile.blood_type.is_none());
        assert!(profile.chronic_diseases.is_none());

        let full = UserProfile {
            blood_type: Some("O+".to_string()),
            chronic_diseases: Some("asthma".to_string()),
            ..profile
        };
        let out = serde_json::to_value(&full).unwrap();
        assert_eq!(out["bloodType"], "O+");
        assert_eq!(out["chronicDiseases"], "asthma");
    }

    #[test]
    fn test_location_age() {
        let fix = LocationUpdate {
            trip_id: 1,
            lat: 24.0,
            lng: 46.0,
            accuracy: Some(12.5),
            timestamp: dt("2024-06-15T05:00:00"),
        };
        assert_eq!(fix.age(dt("2024-06-15T05:05:00")), TimeDelta::minutes(5));
        assert_eq!(fix.point(), GeoPoint { lat: 24.0, lng: 46.0 });
    }
}

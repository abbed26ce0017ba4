//! Trip persistence boundary.
//!
//! The database lives outside this crate. [`TripStore`] is the narrow surface
//! the service needs; [`MemoryStore`] backs the binary and the tests.

use std::collections::HashMap;
use std::future::Future;

use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use trip_clock::{Contact, LocationUpdate, NewTrip, Trip, TripId, UserProfile};

use crate::error::{Result, WatchError};

/// Storage for trips, their location history, contacts and profiles.
pub trait TripStore: Send + Sync + 'static {
    fn create_trip(
        &self,
        new_trip: NewTrip,
        created_at: NaiveDateTime,
    ) -> impl Future<Output = Result<Trip>> + Send;

    fn get_trip(&self, id: TripId) -> impl Future<Output = Result<Option<Trip>>> + Send;

    /// Apply `f` to the stored trip as one atomic step.
    ///
    /// No other update to the same trip can interleave with it. If `f`
    /// returns an error the stored trip is left unchanged.
    fn update_trip<T, F>(&self, id: TripId, f: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send,
        F: FnOnce(&mut Trip) -> Result<T> + Send;

    /// Active trips across all profiles, ordered by id.
    fn active_trips(&self) -> impl Future<Output = Result<Vec<Trip>>> + Send;

    /// Active trips of one profile, ordered by id.
    fn active_trips_for(
        &self,
        user_profile_id: u64,
    ) -> impl Future<Output = Result<Vec<Trip>>> + Send;

    fn record_location(&self, update: LocationUpdate) -> impl Future<Output = Result<()>> + Send;

    fn last_location(
        &self,
        trip_id: TripId,
    ) -> impl Future<Output = Result<Option<LocationUpdate>>> + Send;

    fn contact_by_phone(
        &self,
        user_profile_id: u64,
        phone: &str,
    ) -> impl Future<Output = Result<Option<Contact>>> + Send;

    fn get_profile(&self, id: u64) -> impl Future<Output = Result<Option<UserProfile>>> + Send;
}

#[derive(Default)]
struct Tables {
    next_id: TripId,
    trips: HashMap<TripId, Trip>,
    locations: HashMap<TripId, Vec<LocationUpdate>>,
    contacts: Vec<Contact>,
    profiles: HashMap<u64, UserProfile>,
}

impl Tables {
    fn active(&self, filter: impl Fn(&Trip) -> bool) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self
            .trips
            .values()
            .filter(|t| t.is_active && filter(t))
            .cloned()
            .collect();
        trips.sort_by_key(|t| t.id);
        trips
    }
}

/// In-process store used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_contact(&self, contact: Contact) {
        self.tables.write().await.contacts.push(contact);
    }

    /// Insert or replace the profile with `profile.id`.
    pub async fn upsert_profile(&self, profile: UserProfile) {
        self.tables.write().await.profiles.insert(profile.id, profile);
    }
}

impl TripStore for MemoryStore {
    async fn create_trip(&self, new_trip: NewTrip, created_at: NaiveDateTime) -> Result<Trip> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id + 1;
        let trip = new_trip.into_trip(id, created_at)?;
        tables.next_id = id;
        tables.trips.insert(id, trip.clone());
        Ok(trip)
    }

    async fn get_trip(&self, id: TripId) -> Result<Option<Trip>> {
        Ok(self.tables.read().await.trips.get(&id).cloned())
    }

    async fn update_trip<T, F>(&self, id: TripId, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Trip) -> Result<T> + Send,
    {
        let mut tables = self.tables.write().await;
        let stored = tables.trips.get_mut(&id).ok_or(WatchError::TripNotFound(id))?;
        let mut next = stored.clone();
        let out = f(&mut next)?;
        *stored = next;
        Ok(out)
    }

    async fn active_trips(&self) -> Result<Vec<Trip>> {
        Ok(self.tables.read().await.active(|_| true))
    }

    async fn active_trips_for(&self, user_profile_id: u64) -> Result<Vec<Trip>> {
        Ok(self
            .tables
            .read()
            .await
            .active(|t| t.user_profile_id == user_profile_id))
    }

    async fn record_location(&self, update: LocationUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.trips.contains_key(&update.trip_id) {
            return Err(WatchError::TripNotFound(update.trip_id));
        }
        tables.locations.entry(update.trip_id).or_default().push(update);
        Ok(())
    }

    async fn last_location(&self, trip_id: TripId) -> Result<Option<LocationUpdate>> {
        let tables = self.tables.read().await;
        Ok(tables
            .locations
            .get(&trip_id)
            .and_then(|fixes| fixes.iter().max_by_key(|f| f.timestamp))
            .copied())
    }

    async fn contact_by_phone(&self, user_profile_id: u64, phone: &str) -> Result<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .iter()
            .find(|c| c.user_profile_id == user_profile_id && c.phone == phone)
            .cloned())
    }

    async fn get_profile(&self, id: u64) -> Result<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use trip_clock::{parse_datetime, TimeSlotCode, TripClockError};

    fn dt(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn new_trip() -> NewTrip {
        NewTrip {
            user_profile_id: 1,
            destination: None,
            return_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            return_time_slot: TimeSlotCode::PM_EARLY,
            selected_contact_ids: BTreeSet::from(["0500000001".to_string()]),
        }
    }

    fn fix(trip_id: TripId, at: &str, lat: f64) -> LocationUpdate {
        LocationUpdate {
            trip_id,
            lat,
            lng: 46.0,
            accuracy: None,
            timestamp: dt(at),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();
        let b = store.create_trip(new_trip(), dt("2024-06-15T09:00:00")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.get_trip(2).await.unwrap().unwrap(), b);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_contacts() {
        let store = MemoryStore::new();
        let mut payload = new_trip();
        payload.selected_contact_ids.clear();
        let err = store.create_trip(payload, dt("2024-06-15T08:00:00")).await.unwrap_err();
        assert!(matches!(err, WatchError::Clock(TripClockError::NoContacts)));
        assert!(store.get_trip(1).await.unwrap().is_none());
    }

    fn ids(trips: Vec<Trip>) -> Vec<TripId> {
        trips.iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn test_update_and_active_filter() {
        let store = MemoryStore::new();
        let trip = store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();
        store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();

        store
            .update_trip(trip.id, |t| {
                t.deactivate();
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ids(store.active_trips().await.unwrap()), vec![2]);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_trip_unchanged() {
        let store = MemoryStore::new();
        let trip = store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();

        let err = store
            .update_trip(trip.id, |t| {
                t.deactivate();
                Err::<(), _>(WatchError::Store("rejected".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::Store(_)));
        assert!(store.get_trip(trip.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_unknown_trip() {
        let store = MemoryStore::new();
        let err = store.update_trip(42, |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, WatchError::TripNotFound(42)));
    }

    #[tokio::test]
    async fn test_active_trips_for_profile() {
        let store = MemoryStore::new();
        store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();
        let mut other = new_trip();
        other.user_profile_id = 2;
        store.create_trip(other, dt("2024-06-15T08:00:00")).await.unwrap();
        store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();
        store
            .update_trip(3, |t| {
                t.deactivate();
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ids(store.active_trips_for(1).await.unwrap()), vec![1]);
        assert_eq!(ids(store.active_trips_for(2).await.unwrap()), vec![2]);
        assert!(store.active_trips_for(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_upsert_replaces() {
        let store = MemoryStore::new();
        let mut profile = UserProfile {
            id: 1,
            city: "Jeddah".to_string(),
            blood_type: None,
            chronic_diseases: None,
            created_at: dt("2024-06-01T10:00:00"),
            updated_at: dt("2024-06-01T10:00:00"),
        };
        store.upsert_profile(profile.clone()).await;

        profile.blood_type = Some("A-".to_string());
        profile.updated_at = dt("2024-06-02T10:00:00");
        store.upsert_profile(profile.clone()).await;

        assert_eq!(store.get_profile(1).await.unwrap(), Some(profile));
        assert!(store.get_profile(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_location_is_most_recent() {
        let store = MemoryStore::new();
        let trip = store.create_trip(new_trip(), dt("2024-06-15T08:00:00")).await.unwrap();
        assert!(store.last_location(trip.id).await.unwrap().is_none());

        store.record_location(fix(trip.id, "2024-06-15T09:05:00", 2.0)).await.unwrap();
        store.record_location(fix(trip.id, "2024-06-15T09:00:00", 1.0)).await.unwrap();

        let last = store.last_location(trip.id).await.unwrap().unwrap();
        assert_eq!(last.lat, 2.0);
    }

    #[tokio::test]
    async fn test_location_for_unknown_trip() {
        let store = MemoryStore::new();
        let err = store.record_location(fix(9, "2024-06-15T09:00:00", 1.0)).await.unwrap_err();
        assert!(matches!(err, WatchError::TripNotFound(9)));
    }

    #[tokio::test]
    async fn test_contact_lookup_is_scoped_to_profile() {
        let store = MemoryStore::new();
        store
            .add_contact(Contact {
                id: 1,
                user_profile_id: 1,
                name: "Sara".to_string(),
                phone: "0500000001".to_string(),
                relationship: "sister".to_string(),
            })
            .await;

        let found = store.contact_by_phone(1, "0500000001").await.unwrap();
        assert_eq!(found.unwrap().name, "Sara");
        assert!(store.contact_by_phone(2, "0500000001").await.unwrap().is_none());
    }
}

//! Trip lifecycle operations on top of the return-deadline engine.
//!
//! Callers pass the current UTC instant explicitly; it is converted to the
//! configured zone's wall clock before it meets the engine, so every deadline
//! comparison happens in one zone.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use trip_clock::{
    compose_alert_message, format_phone_number, localize, wall_clock, Countdown, Extension,
    LocationUpdate, NewTrip, TimeSlotCode, Trip, TripClockError, TripId, UserProfile,
};

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::location::LocationSource;
use crate::notifier::Notifier;
use crate::scheduler::TaskScheduler;
use crate::store::TripStore;

/// What the display layer shows for a trip on each refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatus {
    pub trip_id: TripId,
    pub is_active: bool,
    pub return_time_slot: TimeSlotCode,
    /// Deadline as wall-clock time in the configured zone.
    pub deadline: NaiveDateTime,
    /// Deadline as an instant (RFC 3339), when it exists in the zone.
    pub deadline_utc: Option<String>,
    pub countdown: Countdown,
    pub remaining: String,
    pub progress_percent: u8,
}

/// Outcome of alerting one overdue trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertReport {
    pub trip_id: TripId,
    pub delivered: usize,
    pub failed: usize,
    /// Set when the alert went out but could not be recorded on the trip.
    pub error: Option<String>,
}

pub struct TripService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    config: WatchConfig,
    scheduler: TaskScheduler,
    /// Deadlines already alerted whose `alerted_at` could not be stored yet.
    unrecorded_alerts: DashMap<TripId, NaiveDateTime>,
}

impl<S: TripStore, N: Notifier> TripService<S, N> {
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: WatchConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            scheduler: TaskScheduler::new(),
            unrecorded_alerts: DashMap::new(),
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    fn wall_clock(&self, now: DateTime<Utc>) -> NaiveDateTime {
        wall_clock(now, &self.config.timezone)
    }

    async fn load(&self, id: TripId) -> Result<Trip> {
        self.store
            .get_trip(id)
            .await?
            .ok_or(WatchError::TripNotFound(id))
    }

    /// Store a new trip. Date and slot are kept exactly as chosen.
    pub async fn start_trip(&self, new_trip: NewTrip, now: DateTime<Utc>) -> Result<Trip> {
        let trip = self.store.create_trip(new_trip, self.wall_clock(now)).await?;
        info!(
            trip_id = trip.id,
            return_date = %trip.return_date,
            slot = %trip.return_time_slot,
            deadline = %trip.deadline(),
            contacts = trip.selected_contact_ids.len(),
            "Trip started"
        );
        Ok(trip)
    }

    /// Extend by the configured number of hours.
    pub async fn extend_trip(&self, id: TripId) -> Result<Extension> {
        self.extend_trip_by(id, self.config.extension_hours).await
    }

    pub async fn extend_trip_by(&self, id: TripId, hours: i64) -> Result<Extension> {
        let (previous, ext) = self
            .store
            .update_trip(id, |trip| {
                let previous = trip.deadline();
                Ok((previous, trip.extend(hours)?))
            })
            .await?;
        info!(
            trip_id = id,
            requested_hours = hours,
            added_minutes = ext.added.num_minutes(),
            from = %previous,
            to = %ext.deadline,
            slot = %ext.slot,
            "Trip extended"
        );
        Ok(ext)
    }

    /// Deactivate a trip and stop its location timer.
    pub async fn end_trip(&self, id: TripId) -> Result<Trip> {
        let trip = self
            .store
            .update_trip(id, |trip| {
                trip.deactivate();
                Ok(trip.clone())
            })
            .await?;
        self.scheduler.cancel(id);
        self.unrecorded_alerts.remove(&id);
        info!(trip_id = id, "Trip ended");
        Ok(trip)
    }

    pub async fn status(&self, id: TripId, now: DateTime<Utc>) -> Result<TripStatus> {
        let trip = self.load(id).await?;
        let deadline = trip.deadline();
        let countdown = trip.countdown(self.wall_clock(now));
        let deadline_utc = localize(deadline, &self.config.timezone)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).to_rfc3339());

        Ok(TripStatus {
            trip_id: trip.id,
            is_active: trip.is_active,
            return_time_slot: trip.return_time_slot,
            deadline,
            deadline_utc,
            remaining: countdown.label(),
            progress_percent: countdown.progress_percent(),
            countdown,
        })
    }

    /// Active trips of one profile.
    pub async fn active_trips(&self, user_profile_id: u64) -> Result<Vec<Trip>> {
        self.store.active_trips_for(user_profile_id).await
    }

    pub async fn profile(&self, id: u64) -> Result<UserProfile> {
        self.store
            .get_profile(id)
            .await?
            .ok_or(WatchError::ProfileNotFound(id))
    }

    /// Append a location fix to an active trip.
    pub async fn record_location(&self, update: LocationUpdate) -> Result<()> {
        let trip = self.load(update.trip_id).await?;
        if !trip.is_active {
            return Err(TripClockError::TripInactive(trip.id).into());
        }
        self.store.record_location(update).await?;
        debug!(trip_id = trip.id, lat = update.lat, lng = update.lng, "Location recorded");
        Ok(())
    }

    /// Sample `source` periodically for an active trip, using the weak or
    /// strong interval depending on the source's current network.
    pub async fn track_location<L: LocationSource>(
        &self,
        id: TripId,
        source: Arc<L>,
    ) -> Result<()> {
        let trip = self.load(id).await?;
        if !trip.is_active {
            return Err(TripClockError::TripInactive(id).into());
        }

        let policy = self.config.location_intervals;
        let tz = self.config.timezone;
        let store = Arc::clone(&self.store);
        let network_source = Arc::clone(&source);

        let started = self.scheduler.schedule(
            id,
            move || {
                let strength = network_source.network().strength();
                let interval = policy.interval_for(strength);
                debug!(
                    trip_id = id,
                    ?strength,
                    interval_secs = interval.as_secs(),
                    "Next location sample"
                );
                interval
            },
            move || {
                let store = Arc::clone(&store);
                let source = Arc::clone(&source);
                async move {
                    let Some(position) = source.current_position().await else {
                        warn!(trip_id = id, "No position fix");
                        return;
                    };
                    let update = LocationUpdate {
                        trip_id: id,
                        lat: position.lat,
                        lng: position.lng,
                        accuracy: position.accuracy,
                        timestamp: wall_clock(Utc::now(), &tz),
                    };
                    if let Err(e) = store.record_location(update).await {
                        warn!(trip_id = id, error = %e, "Failed to save location");
                    }
                }
            },
        );
        if started {
            info!(trip_id = id, "Location tracking started");
        } else {
            warn!(trip_id = id, "Service shutting down, location tracking not started");
        }
        Ok(())
    }

    pub fn stop_tracking(&self, id: TripId) -> bool {
        self.scheduler.cancel(id)
    }

    /// Alert the contacts of every active trip whose deadline has passed and
    /// that has not been alerted for its current deadline.
    ///
    /// Trips are handled independently: a store or delivery failure on one
    /// trip is logged and reported, and the remaining trips are still alerted.
    pub async fn dispatch_overdue_alerts(&self, now: DateTime<Utc>) -> Result<Vec<AlertReport>> {
        let now = self.wall_clock(now);
        let mut reports = Vec::new();

        for trip in self.store.active_trips().await? {
            if !trip.is_overdue(now) {
                continue;
            }
            let deadline = trip.deadline();
            let already_sent = self
                .unrecorded_alerts
                .get(&trip.id)
                .is_some_and(|d| *d == deadline);
            if already_sent {
                self.retry_record_alert(trip.id, deadline, now).await;
                continue;
            }
            reports.push(self.alert_trip(&trip, now).await);
        }
        Ok(reports)
    }

    async fn alert_trip(&self, trip: &Trip, now: NaiveDateTime) -> AlertReport {
        let last = match self.store.last_location(trip.id).await {
            Ok(last) => last.map(|l| l.point()),
            Err(e) => {
                warn!(trip_id = trip.id, error = %e, "Last location unavailable");
                None
            }
        };
        let message = compose_alert_message(last, trip.destination);

        let mut report = AlertReport {
            trip_id: trip.id,
            delivered: 0,
            failed: 0,
            error: None,
        };

        for raw in &trip.selected_contact_ids {
            let phone = format_phone_number(raw, &self.config.sms_country_code);
            let contact = match self.store.contact_by_phone(trip.user_profile_id, raw).await {
                Ok(found) => found.map(|c| c.name).unwrap_or_default(),
                Err(e) => {
                    debug!(trip_id = trip.id, error = %e, "Contact lookup failed");
                    String::new()
                }
            };

            match self.notifier.send(&phone, &message).await {
                Ok(delivery) => {
                    report.delivered += 1;
                    info!(
                        trip_id = trip.id,
                        to = %phone,
                        contact = %contact,
                        message_id = %delivery.message_id,
                        "Overdue alert sent"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(trip_id = trip.id, to = %phone, error = %e, "Overdue alert failed");
                }
            }
        }

        if report.delivered == 0 {
            warn!(trip_id = trip.id, "No alert delivered, retrying on next check");
            return report;
        }

        let deadline = trip.deadline();
        match self.record_alert(trip.id, deadline, now).await {
            Ok(()) => {
                self.unrecorded_alerts.remove(&trip.id);
            }
            Err(e) => {
                error!(trip_id = trip.id, error = %e, "Alert sent but not recorded");
                self.unrecorded_alerts.insert(trip.id, deadline);
                report.error = Some(e.to_string());
            }
        }
        report
    }

    /// Mark the trip alerted, unless it was extended or ended meanwhile.
    async fn record_alert(
        &self,
        id: TripId,
        deadline: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<()> {
        self.store
            .update_trip(id, |trip| {
                if trip.is_active && trip.deadline() == deadline {
                    trip.mark_alerted(now);
                }
                Ok(())
            })
            .await
    }

    async fn retry_record_alert(&self, id: TripId, deadline: NaiveDateTime, now: NaiveDateTime) {
        match self.record_alert(id, deadline, now).await {
            Ok(()) => {
                self.unrecorded_alerts.remove(&id);
                info!(trip_id = id, "Earlier alert recorded");
            }
            Err(e) => warn!(trip_id = id, error = %e, "Alert still not recorded"),
        }
    }

    /// Stop all location timers.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

//! Cancellable periodic timers keyed by trip id.
//!
//! At most one timer runs per trip: scheduling again for the same trip cancels
//! the previous timer. The task runs immediately, then the interval is read
//! again before every sleep so that it can follow changing conditions (signal
//! strength).

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use trip_clock::TripId;

pub struct TaskScheduler {
    timers: DashMap<TripId, CancellationToken>,
    root: CancellationToken,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            timers: DashMap::new(),
            root: CancellationToken::new(),
        }
    }

    /// Start a periodic timer for `trip_id`, replacing any existing one.
    /// Returns `false` without starting anything after [`shutdown`](Self::shutdown).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<I, F, Fut>(&self, trip_id: TripId, mut interval: I, mut task: F) -> bool
    where
        I: FnMut() -> Duration + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.root.is_cancelled() {
            return false;
        }
        let token = self.root.child_token();
        if let Some(previous) = self.timers.insert(trip_id, token.clone()) {
            previous.cancel();
            tracing::debug!(trip_id, "Replaced existing timer");
        }

        tokio::spawn(async move {
            loop {
                if token.is_cancelled() {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = task() => {}
                }
                let wait = interval();
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
            tracing::debug!(trip_id, "Timer stopped");
        });
        true
    }

    /// Stop the timer for `trip_id`. Returns whether one was running.
    pub fn cancel(&self, trip_id: TripId) -> bool {
        match self.timers.remove(&trip_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, trip_id: TripId) -> bool {
        self.timers
            .get(&trip_id)
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Stop every timer. Later calls to [`schedule`](Self::schedule) are refused.
    pub fn shutdown(&self) {
        self.root.cancel();
        self.timers.clear();
    }
}

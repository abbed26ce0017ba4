//! Position acquisition boundary.
//!
//! Geolocation happens on the traveller's device. A [`LocationSource`]
//! supplies the current fix and the connection quality that picks the
//! sampling interval.

use std::future::Future;

use crate::policy::NetworkInfo;

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    /// Accuracy radius in metres.
    pub accuracy: Option<f64>,
}

pub trait LocationSource: Send + Sync + 'static {
    /// The current position, or `None` if no fix could be obtained.
    fn current_position(&self) -> impl Future<Output = Option<Position>> + Send;

    /// The connection as it is right now.
    fn network(&self) -> NetworkInfo;
}

//! Outbound alert delivery.
//!
//! SMS providers are external. [`Notifier`] is the send-one-message surface
//! the service depends on; [`LogNotifier`] logs messages instead of sending
//! them, for development and for deployments without a provider.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Receipt for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: String,
}

pub trait Notifier: Send + Sync + 'static {
    /// Send `message` to an international-format phone number.
    fn send(&self, phone: &str, message: &str) -> impl Future<Output = Result<Delivery>> + Send;
}

/// Writes each message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for LogNotifier {
    async fn send(&self, phone: &str, message: &str) -> Result<Delivery> {
        let seq = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(to = %phone, seq, "SMS not sent (no provider configured)");
        tracing::debug!(to = %phone, body = %message, "SMS body");
        Ok(Delivery {
            message_id: format!("dev-{seq}"),
        })
    }
}

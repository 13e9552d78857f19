//! Notification sink trait and implementations.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::RideStatusEvent;

/// A delivery target for bus events: a channel, socket writer or callback.
///
/// # Design Rules
///
/// - `deliver()` may be slow or never complete; the bus only ever awaits it
///   from the subscription's own delivery task.
/// - Delivery failures stay inside the sink; the publisher never sees them.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: Arc<RideStatusEvent>);

    /// Whether the sink can no longer accept events (e.g. its receiver is gone).
    fn is_closed(&self) -> bool {
        false
    }
}

#[async_trait]
impl NotificationSink for mpsc::Sender<Arc<RideStatusEvent>> {
    async fn deliver(&self, event: Arc<RideStatusEvent>) {
        // Waits when the channel is full: that stalls only this subscription.
        let _ = self.send(event).await;
    }

    fn is_closed(&self) -> bool {
        mpsc::Sender::is_closed(self)
    }
}

#[async_trait]
impl NotificationSink for mpsc::UnboundedSender<Arc<RideStatusEvent>> {
    async fn deliver(&self, event: Arc<RideStatusEvent>) {
        let _ = self.send(event);
    }

    fn is_closed(&self) -> bool {
        mpsc::UnboundedSender::is_closed(self)
    }
}

/// Mock sink for testing - collects delivered events.
#[derive(Clone, Default)]
pub struct MockNotificationSink {
    events: Arc<Mutex<Vec<Arc<RideStatusEvent>>>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<Arc<RideStatusEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

#[async_trait]
impl NotificationSink for MockNotificationSink {
    async fn deliver(&self, event: Arc<RideStatusEvent>) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

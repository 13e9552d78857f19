//! In-process publish/subscribe for ride status changes.
//!
//! Each subscription gets an unbounded mailbox and a delivery task that feeds
//! the sink. `publish` snapshots the topic's mailboxes under the read lock,
//! releases it, then drops the event into every mailbox without awaiting, so a
//! slow sink can only hold up its own delivery task. Events for one sink stay
//! in publish order.
//!
//! Delivery is best effort: publishing to a topic nobody listens to is a
//! silent no-op, and a sink that never drains accumulates pending events.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use tokio::sync::mpsc;

use super::{NotificationSink, RideStatusEvent, RideStatusEventData};

type Mailbox = mpsc::UnboundedSender<Arc<RideStatusEvent>>;

/// Topic -> subscriber registry with non-blocking fan-out.
#[derive(Default)]
pub struct NotificationBus {
    subscribers: RwLock<HashMap<String, Vec<Mailbox>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sink` for every future publish on `topic`.
    ///
    /// Registering again for the same topic adds another subscriber; each
    /// receives every event.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the sink's delivery
    /// task is spawned on the current runtime.
    pub fn subscribe(&self, topic: impl Into<String>, sink: Arc<dyn NotificationSink>) {
        let topic = topic.into();
        let (mailbox, rx) = mpsc::unbounded_channel();
        tokio::spawn(deliver_to_sink(topic.clone(), rx, sink));

        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.entry(topic).or_default().push(mailbox);
    }

    /// Removes every subscriber of `topic`. Unknown topics are ignored.
    ///
    /// Events already handed to a mailbox are still delivered.
    pub fn unsubscribe(&self, topic: &str) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(removed) = subscribers.remove(topic) {
            debug!("Unsubscribed {} sink(s) from {}", removed.len(), topic);
        }
    }

    /// Fans `data` out to the current subscribers of `topic`.
    ///
    /// Returns how many subscribers the event was handed to. Never blocks on
    /// a sink.
    pub fn publish(&self, topic: &str, data: RideStatusEventData) -> usize {
        let snapshot: Vec<Mailbox> = {
            let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
            match subscribers.get(topic) {
                Some(mailboxes) => mailboxes.clone(),
                None => return 0,
            }
        };

        let event = Arc::new(RideStatusEvent {
            topic: topic.to_string(),
            data,
        });

        snapshot
            .iter()
            .filter(|mailbox| mailbox.send(Arc::clone(&event)).is_ok())
            .count()
    }

    /// Number of sinks currently registered under `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

async fn deliver_to_sink(
    topic: String,
    mut rx: mpsc::UnboundedReceiver<Arc<RideStatusEvent>>,
    sink: Arc<dyn NotificationSink>,
) {
    while let Some(event) = rx.recv().await {
        sink.deliver(event).await;
        if sink.is_closed() {
            debug!("Sink for {} closed, stopping delivery", topic);
            return;
        }
    }
}

//! Notifications module - topic-based fan-out of ride status changes.

mod bus;
mod notification_model;
mod sink;

pub use bus::NotificationBus;
pub use notification_model::{chair_topic, ride_topic, RideStatusEvent, RideStatusEventData};
pub use sink::{MockNotificationSink, NotificationSink};

//! Notification event types.

use serde::{Deserialize, Serialize};

use crate::constants::{CHAIR_TOPIC_PREFIX, RIDE_TOPIC_PREFIX};
use crate::rides::{Ride, RideStatus};

/// Ride snapshot plus the status that was just reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideStatusEventData {
    pub ride: Ride,
    pub status: RideStatus,
}

/// A status change travelling on the notification bus. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideStatusEvent {
    pub topic: String,
    pub data: RideStatusEventData,
}

/// Topic carrying every status change of one ride.
pub fn ride_topic(ride_id: &str) -> String {
    format!("{}{}", RIDE_TOPIC_PREFIX, ride_id)
}

/// Topic carrying status changes of every ride assigned to one chair.
pub fn chair_topic(chair_id: &str) -> String {
    format!("{}{}", CHAIR_TOPIC_PREFIX, chair_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_are_namespaced() {
        assert_eq!(ride_topic("01J"), "ride:01J");
        assert_eq!(chair_topic("01J"), "chair:01J");
        assert_ne!(ride_topic("x"), chair_topic("x"));
    }
}

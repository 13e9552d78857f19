use log::{debug, info};
use std::sync::Arc;

use super::rides_model::{NewRide, Ride, RideStatus, RideStatusRecord};
use super::rides_traits::{RideRepositoryTrait, RideServiceTrait};
use crate::errors::Result;
use crate::notifications::{chair_topic, ride_topic, NotificationBus, RideStatusEventData};

/// Service for creating rides and advancing their status.
///
/// Every recorded status is published on the ride's topic, and on the chair's
/// topic once a chair is assigned.
pub struct RideService {
    repository: Arc<dyn RideRepositoryTrait>,
    bus: Arc<NotificationBus>,
}

impl RideService {
    pub fn new(repository: Arc<dyn RideRepositoryTrait>, bus: Arc<NotificationBus>) -> Self {
        Self { repository, bus }
    }

    fn publish(&self, ride: &Ride, status: RideStatus) {
        let data = RideStatusEventData {
            ride: ride.clone(),
            status,
        };
        let mut delivered = 0;
        if let Some(chair_id) = &ride.chair_id {
            delivered += self.bus.publish(&chair_topic(chair_id), data.clone());
        }
        delivered += self.bus.publish(&ride_topic(&ride.id), data);
        debug!("Published {} for ride {} to {} subscriber(s)", status, ride.id, delivered);
    }
}

#[async_trait::async_trait]
impl RideServiceTrait for RideService {
    async fn create_ride(&self, new_ride: NewRide) -> Result<Ride> {
        new_ride.validate()?;
        let ride = self.repository.insert_ride(new_ride).await?;
        info!("Created ride {} for user {}", ride.id, ride.user_id);
        self.publish(&ride, RideStatus::Matching);
        Ok(ride)
    }

    fn get_ride(&self, ride_id: &str) -> Result<Ride> {
        self.repository.get_ride(ride_id)
    }

    fn current_status(&self, ride_id: &str) -> Result<RideStatus> {
        Ok(self
            .repository
            .latest_status(ride_id)?
            .map_or(RideStatus::Matching, |record| record.status))
    }

    async fn update_status(&self, ride_id: &str, next: RideStatus) -> Result<RideStatusRecord> {
        let transition = self.repository.transition_status(ride_id, next).await?;
        info!("Ride {} moved from {} to {}", ride_id, transition.from, next);
        self.publish(&transition.ride, next);
        Ok(transition.record)
    }
}

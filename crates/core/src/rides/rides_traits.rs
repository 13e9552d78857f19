use async_trait::async_trait;

use super::rides_model::{NewRide, Ride, RideStatus, RideStatusRecord, StatusTransition};
use crate::errors::Result;

/// Trait for ride repository operations
#[async_trait]
pub trait RideRepositoryTrait: Send + Sync {
    /// Inserts the ride together with its initial `MATCHING` status record.
    async fn insert_ride(&self, new_ride: NewRide) -> Result<Ride>;
    fn get_ride(&self, ride_id: &str) -> Result<Ride>;
    fn latest_status(&self, ride_id: &str) -> Result<Option<RideStatusRecord>>;

    /// Reads the latest status, applies `check_transition` and appends `next`
    /// as one atomic write, so concurrent updates cannot both pass the check.
    async fn transition_status(&self, ride_id: &str, next: RideStatus) -> Result<StatusTransition>;
}

/// Trait for ride service operations
#[async_trait]
pub trait RideServiceTrait: Send + Sync {
    async fn create_ride(&self, new_ride: NewRide) -> Result<Ride>;
    fn get_ride(&self, ride_id: &str) -> Result<Ride>;
    fn current_status(&self, ride_id: &str) -> Result<RideStatus>;
    async fn update_status(&self, ride_id: &str, next: RideStatus) -> Result<RideStatusRecord>;
}

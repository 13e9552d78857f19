use async_trait::async_trait;

use super::chairs_model::{Chair, ChairLocation, ChairModel, NearbyChair, NewChair, RecordedLocation};
use crate::distance::ChairTotalDistance;
use crate::errors::Result;
use crate::geometry::Coordinate;

/// Trait for chair repository operations
#[async_trait]
pub trait ChairRepositoryTrait: Send + Sync {
    fn list_chair_models(&self) -> Result<Vec<ChairModel>>;
    fn get_chair(&self, chair_id: &str) -> Result<Chair>;
    async fn insert_chair(&self, new_chair: NewChair, access_token: String) -> Result<Chair>;
    async fn set_chair_active(&self, chair_id: &str, is_active: bool) -> Result<Chair>;
    /// Appends a location sample and returns it with the previous latest sample,
    /// read in the same transaction.
    async fn record_location(&self, chair_id: &str, coordinate: Coordinate) -> Result<RecordedLocation>;
    fn latest_location(&self, chair_id: &str) -> Result<Option<ChairLocation>>;
    /// Active chairs that are free to take a ride and have reported a location.
    fn list_available_chairs_with_location(&self) -> Result<Vec<NearbyChair>>;
}

/// Trait for chair service operations
#[async_trait]
pub trait ChairServiceTrait: Send + Sync {
    async fn register_chair(&self, new_chair: NewChair) -> Result<Chair>;
    fn get_chair(&self, chair_id: &str) -> Result<Chair>;
    async fn set_active(&self, chair_id: &str, is_active: bool) -> Result<Chair>;
    fn nearby_chairs(&self, center: Coordinate, distance: i64) -> Result<Vec<NearbyChair>>;
    fn get_total_distance(&self, chair_id: &str) -> Result<Option<ChairTotalDistance>>;
}

/// Trait for ingesting chair location updates.
#[async_trait]
pub trait ChairLocationServiceTrait: Send + Sync {
    async fn record_location(&self, chair_id: &str, coordinate: Coordinate) -> Result<ChairLocation>;
}

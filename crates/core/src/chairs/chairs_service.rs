use log::{debug, info};
use rand::RngCore;
use std::sync::Arc;

use super::chairs_model::{Chair, ChairModelCatalog, NearbyChair, NewChair};
use super::chairs_traits::{ChairRepositoryTrait, ChairServiceTrait};
use crate::constants::ACCESS_TOKEN_BYTES;
use crate::distance::{ChairTotalDistance, DistanceRepositoryTrait};
use crate::errors::{Result, ValidationError};
use crate::geometry::{manhattan_distance, Coordinate};

/// Service for chair registration, availability and lookups.
pub struct ChairService {
    repository: Arc<dyn ChairRepositoryTrait>,
    distance_repository: Arc<dyn DistanceRepositoryTrait>,
    catalog: Arc<ChairModelCatalog>,
}

impl ChairService {
    pub fn new(
        repository: Arc<dyn ChairRepositoryTrait>,
        distance_repository: Arc<dyn DistanceRepositoryTrait>,
        catalog: Arc<ChairModelCatalog>,
    ) -> Self {
        Self {
            repository,
            distance_repository,
            catalog,
        }
    }
}

fn generate_access_token() -> String {
    let mut bytes = [0u8; ACCESS_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait::async_trait]
impl ChairServiceTrait for ChairService {
    async fn register_chair(&self, new_chair: NewChair) -> Result<Chair> {
        new_chair.validate()?;
        if !self.catalog.contains(&new_chair.model) {
            return Err(ValidationError::InvalidInput(format!(
                "unknown chair model '{}'",
                new_chair.model
            ))
            .into());
        }

        let chair = self
            .repository
            .insert_chair(new_chair, generate_access_token())
            .await?;
        info!("Registered chair {} ({})", chair.id, chair.model);
        Ok(chair)
    }

    fn get_chair(&self, chair_id: &str) -> Result<Chair> {
        self.repository.get_chair(chair_id)
    }

    async fn set_active(&self, chair_id: &str, is_active: bool) -> Result<Chair> {
        let chair = self.repository.set_chair_active(chair_id, is_active).await?;
        debug!("Chair {} is_active={}", chair.id, chair.is_active);
        Ok(chair)
    }

    /// Available chairs strictly within `distance` (Manhattan) of `center`.
    fn nearby_chairs(&self, center: Coordinate, distance: i64) -> Result<Vec<NearbyChair>> {
        if distance < 0 {
            return Err(ValidationError::InvalidInput("distance must not be negative".to_string()).into());
        }
        let chairs = self.repository.list_available_chairs_with_location()?;
        Ok(chairs
            .into_iter()
            .filter(|chair| manhattan_distance(center, chair.current_coordinate) < distance)
            .collect())
    }

    fn get_total_distance(&self, chair_id: &str) -> Result<Option<ChairTotalDistance>> {
        // Surface a not-found for unknown chairs rather than an empty total.
        self.repository.get_chair(chair_id)?;
        self.distance_repository.get_chair_total_distance(chair_id)
    }
}

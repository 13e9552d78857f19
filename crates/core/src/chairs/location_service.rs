use log::{debug, warn};
use std::sync::Arc;

use super::chairs_model::ChairLocation;
use super::chairs_traits::{ChairLocationServiceTrait, ChairRepositoryTrait};
use crate::distance::{ChairTotalDistanceDelta, DistanceAggregationWriter, EnqueueError};
use crate::errors::Result;
use crate::geometry::{manhattan_distance, Coordinate};

/// Records chair positions and feeds movement into the distance writer.
pub struct ChairLocationService {
    repository: Arc<dyn ChairRepositoryTrait>,
    writer: Arc<DistanceAggregationWriter>,
}

impl ChairLocationService {
    pub fn new(repository: Arc<dyn ChairRepositoryTrait>, writer: Arc<DistanceAggregationWriter>) -> Self {
        Self { repository, writer }
    }
}

#[async_trait::async_trait]
impl ChairLocationServiceTrait for ChairLocationService {
    async fn record_location(&self, chair_id: &str, coordinate: Coordinate) -> Result<ChairLocation> {
        let recorded = self.repository.record_location(chair_id, coordinate).await?;

        let moved = recorded
            .previous
            .map_or(0, |previous| manhattan_distance(previous, coordinate));
        if moved > 0 {
            let delta = ChairTotalDistanceDelta {
                chair_id: chair_id.to_string(),
                distance: moved,
                updated_at: recorded.location.created_at,
            };
            match self.writer.enqueue(delta) {
                Ok(()) => debug!("Queued {} units of movement for chair {}", moved, chair_id),
                Err(EnqueueError::QueueFull(delta)) => {
                    warn!(
                        "Distance queue full, dropping {} units for chair {}",
                        delta.distance, delta.chair_id
                    );
                }
                Err(EnqueueError::Closed(delta)) => {
                    warn!(
                        "Distance writer stopped, dropping {} units for chair {}",
                        delta.distance, delta.chair_id
                    );
                }
            }
        }

        Ok(recorded.location)
    }
}

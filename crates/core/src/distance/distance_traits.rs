use async_trait::async_trait;

use super::distance_model::{ChairTotalDistance, ChairTotalDistanceDelta};
use crate::errors::Result;

/// Trait for total-distance persistence.
#[async_trait]
pub trait DistanceRepositoryTrait: Send + Sync {
    /// Adds every delta to its chair's running total in one atomic write.
    ///
    /// Rows that do not exist yet are created with the delta as the total.
    /// Existing totals are incremented, never overwritten.
    async fn upsert_chair_total_distances(&self, batch: Vec<ChairTotalDistanceDelta>) -> Result<usize>;

    fn get_chair_total_distance(&self, chair_id: &str) -> Result<Option<ChairTotalDistance>>;

    /// Recomputes every total from the location log, replacing stored totals.
    /// Returns the number of chairs written.
    async fn rebuild_chair_total_distances(&self) -> Result<usize>;
}

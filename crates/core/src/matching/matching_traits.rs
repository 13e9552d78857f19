use async_trait::async_trait;

use super::matching_model::{ChairCandidate, MatchResult};
use crate::errors::Result;
use crate::rides::Ride;

/// Storage operations the dispatch matcher depends on.
#[async_trait]
pub trait MatchingRepositoryTrait: Send + Sync {
    /// The unassigned ride with the smallest `created_at`.
    fn find_oldest_unassigned_ride(&self) -> Result<Option<Ride>>;

    /// Active chairs whose latest ride is completed or that never had one,
    /// ordered by chair id.
    fn find_eligible_chairs_with_latest_location(&self) -> Result<Vec<ChairCandidate>>;

    async fn assign_chair_to_ride(&self, ride_id: &str, chair_id: &str) -> Result<()>;
}

/// Trait for the dispatch matcher.
#[async_trait]
pub trait MatchingServiceTrait: Send + Sync {
    /// Assigns at most one chair to at most one ride.
    async fn run_matching_pass(&self) -> Result<MatchResult>;
}

use log::{debug, info};
use std::sync::Arc;

use super::matching_model::{ChairCandidate, MatchResult, ScoredChair};
use super::matching_traits::{MatchingRepositoryTrait, MatchingServiceTrait};
use crate::chairs::ChairModelCatalog;
use crate::errors::Result;
use crate::geometry::{ride_cost, Coordinate};

/// Picks the candidate with the lowest pickup-plus-trip time.
///
/// Candidates are scanned in the given order and a later one only wins with a
/// strictly lower cost, so ties go to the first. Candidates without a known
/// location are skipped. An unknown or non-positive model speed aborts the
/// selection with a configuration error.
pub fn select_fastest_chair(
    candidates: &[ChairCandidate],
    catalog: &ChairModelCatalog,
    pickup: Coordinate,
    destination: Coordinate,
) -> Result<Option<ScoredChair>> {
    let mut best: Option<ScoredChair> = None;

    for candidate in candidates {
        let Some(location) = candidate.location else {
            debug!("Chair {} has no location yet, skipping", candidate.chair_id);
            continue;
        };
        let speed = catalog.speed_of(&candidate.model)?;
        let cost = ride_cost(location, speed, pickup, destination);

        let better = match &best {
            Some(current) => cost < current.cost,
            None => true,
        };
        if better {
            best = Some(ScoredChair {
                chair_id: candidate.chair_id.clone(),
                cost,
            });
        }
    }

    Ok(best)
}

/// Dispatch matcher. Stateless between passes.
pub struct MatchingService {
    repository: Arc<dyn MatchingRepositoryTrait>,
    catalog: Arc<ChairModelCatalog>,
}

impl MatchingService {
    pub fn new(repository: Arc<dyn MatchingRepositoryTrait>, catalog: Arc<ChairModelCatalog>) -> Self {
        Self { repository, catalog }
    }
}

#[async_trait::async_trait]
impl MatchingServiceTrait for MatchingService {
    async fn run_matching_pass(&self) -> Result<MatchResult> {
        let Some(ride) = self.repository.find_oldest_unassigned_ride()? else {
            debug!("No unassigned ride waiting");
            return Ok(MatchResult::NoUnassignedRide);
        };

        let candidates = self.repository.find_eligible_chairs_with_latest_location()?;
        let Some(winner) = select_fastest_chair(&candidates, &self.catalog, ride.pickup, ride.destination)? else {
            debug!(
                "No eligible chair for ride {} ({} candidates considered)",
                ride.id,
                candidates.len()
            );
            return Ok(MatchResult::NoEligibleChair { ride_id: ride.id });
        };

        self.repository
            .assign_chair_to_ride(&ride.id, &winner.chair_id)
            .await?;
        info!(
            "Matched ride {} with chair {} (cost {:.3})",
            ride.id, winner.chair_id, winner.cost
        );

        Ok(MatchResult::Matched {
            ride_id: ride.id,
            chair_id: winner.chair_id,
            cost: winner.cost,
        })
    }
}

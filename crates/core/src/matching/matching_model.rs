//! Dispatch matching models.

use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;

/// A chair that may take the next ride, with its latest known location.
///
/// `location` is `None` when the chair has never reported a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChairCandidate {
    pub chair_id: String,
    pub model: String,
    pub location: Option<Coordinate>,
}

/// The winning candidate of a selection and its cost in time units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredChair {
    pub chair_id: String,
    pub cost: f64,
}

/// Outcome of one matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MatchResult {
    #[serde(rename_all = "camelCase")]
    Matched {
        ride_id: String,
        chair_id: String,
        cost: f64,
    },
    NoUnassignedRide,
    #[serde(rename_all = "camelCase")]
    NoEligibleChair { ride_id: String },
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

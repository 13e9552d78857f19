//! Ride domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};
use crate::geometry::Coordinate;

/// A transport request from pickup to destination.
///
/// `chair_id` stays `None` until the dispatch matcher assigns a chair; once
/// set it is never cleared by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: String,
    pub user_id: String,
    pub chair_id: Option<String>,
    pub pickup: Coordinate,
    pub destination: Coordinate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for requesting a ride.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    pub user_id: String,
    pub pickup: Coordinate,
    pub destination: Coordinate,
}

impl NewRide {
    pub fn validate(&self) -> crate::Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()).into());
        }
        if self.pickup == self.destination {
            return Err(ValidationError::InvalidInput(
                "pickup and destination must differ".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Lifecycle status of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Matching,
    Enroute,
    Pickup,
    Carrying,
    Arrived,
    Completed,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Matching => "MATCHING",
            RideStatus::Enroute => "ENROUTE",
            RideStatus::Pickup => "PICKUP",
            RideStatus::Carrying => "CARRYING",
            RideStatus::Arrived => "ARRIVED",
            RideStatus::Completed => "COMPLETED",
        }
    }

    /// Whether a chair whose latest ride has this status may take a new ride.
    pub fn frees_chair(&self) -> bool {
        matches!(self, RideStatus::Completed)
    }

    /// Whether `next` may directly follow this status.
    pub fn can_transition_to(&self, next: RideStatus) -> bool {
        use RideStatus::*;
        matches!(
            (self, next),
            (Matching, Enroute)
                | (Enroute, Pickup)
                | (Pickup, Carrying)
                | (Carrying, Arrived)
                | (Arrived, Completed)
        )
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCHING" => Ok(RideStatus::Matching),
            "ENROUTE" => Ok(RideStatus::Enroute),
            "PICKUP" => Ok(RideStatus::Pickup),
            "CARRYING" => Ok(RideStatus::Carrying),
            "ARRIVED" => Ok(RideStatus::Arrived),
            "COMPLETED" => Ok(RideStatus::Completed),
            other => Err(ValidationError::InvalidInput(format!("unknown ride status '{}'", other)).into()),
        }
    }
}

/// One entry of a ride's append-only status log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideStatusRecord {
    pub id: String,
    pub ride_id: String,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
}

/// Checks that `ride` may move from `current` to `next`.
///
/// Every status after `MATCHING` needs an assigned chair.
pub fn check_transition(ride: &Ride, current: RideStatus, next: RideStatus) -> crate::Result<()> {
    if !current.can_transition_to(next) {
        return Err(Error::InvalidTransition {
            ride_id: ride.id.clone(),
            from: current,
            to: next,
        });
    }
    if ride.chair_id.is_none() {
        return Err(ValidationError::InvalidInput(format!(
            "ride {} has no chair assigned yet",
            ride.id
        ))
        .into());
    }
    Ok(())
}

/// Result of an applied status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub ride: Ride,
    pub from: RideStatus,
    pub record: RideStatusRecord,
}

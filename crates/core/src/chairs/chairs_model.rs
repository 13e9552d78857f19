//! Chair domain models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::geometry::Coordinate;

/// A mobile worker that fulfils rides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chair {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for registering a chair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChair {
    pub owner_id: String,
    pub name: String,
    pub model: String,
}

impl NewChair {
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingField("ownerId".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField("model".to_string()).into());
        }
        Ok(())
    }
}

/// A chair model and its movement speed in grid units per time unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairModel {
    pub name: String,
    pub speed: i32,
}

/// Immutable name -> speed table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ChairModelCatalog {
    speeds: HashMap<String, i32>,
}

impl ChairModelCatalog {
    pub fn new(models: Vec<ChairModel>) -> Self {
        let speeds = models.into_iter().map(|m| (m.name, m.speed)).collect();
        Self { speeds }
    }

    /// Speed of the named model.
    ///
    /// Model data is trusted reference data, so an unknown model or a
    /// non-positive speed is a configuration error rather than a runtime
    /// condition to work around.
    pub fn speed_of(&self, model: &str) -> Result<i32> {
        match self.speeds.get(model) {
            Some(&speed) if speed > 0 => Ok(speed),
            Some(&speed) => Err(Error::InvalidConfigValue(format!(
                "chair model '{}' has non-positive speed {}",
                model, speed
            ))),
            None => Err(Error::InvalidConfigValue(format!(
                "chair model '{}' is not in the catalog",
                model
            ))),
        }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.speeds.contains_key(model)
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}

/// One sample of a chair's append-only location log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChairLocation {
    pub id: String,
    pub chair_id: String,
    pub coordinate: Coordinate,
    pub created_at: DateTime<Utc>,
}

/// Result of appending a location sample, with the sample it superseded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLocation {
    pub location: ChairLocation,
    pub previous: Option<Coordinate>,
}

/// An available chair together with where it currently is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyChair {
    pub id: String,
    pub name: String,
    pub model: String,
    pub current_coordinate: Coordinate,
}

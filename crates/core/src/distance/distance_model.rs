use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative distance a chair has travelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChairTotalDistance {
    pub chair_id: String,
    pub total_distance: i64,
    pub total_distance_updated_at: DateTime<Utc>,
}

/// An incremental distance contribution waiting to be folded into
/// `ChairTotalDistance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChairTotalDistanceDelta {
    pub chair_id: String,
    pub distance: i64,
    pub updated_at: DateTime<Utc>,
}

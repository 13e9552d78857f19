//! Database models for chair total distances.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use isuride_core::distance::{ChairTotalDistance, ChairTotalDistanceDelta};

/// Database model for chair total distances
#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chair_total_distances)]
#[diesel(primary_key(chair_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChairTotalDistanceDB {
    pub chair_id: String,
    pub total_distance: i64,
    pub total_distance_updated_at: NaiveDateTime,
}

impl From<ChairTotalDistanceDB> for ChairTotalDistance {
    fn from(db: ChairTotalDistanceDB) -> Self {
        Self {
            chair_id: db.chair_id,
            total_distance: db.total_distance,
            total_distance_updated_at: db.total_distance_updated_at.and_utc(),
        }
    }
}

impl From<ChairTotalDistanceDelta> for ChairTotalDistanceDB {
    fn from(delta: ChairTotalDistanceDelta) -> Self {
        Self {
            chair_id: delta.chair_id,
            total_distance: delta.distance,
            total_distance_updated_at: delta.updated_at.naive_utc(),
        }
    }
}

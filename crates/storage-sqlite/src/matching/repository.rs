use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_types::{Integer, Nullable, Text};
use diesel::SqliteConnection;
use std::sync::Arc;

use isuride_core::errors::{DatabaseError, Error};
use isuride_core::geometry::Coordinate;
use isuride_core::matching::{ChairCandidate, MatchingRepositoryTrait};
use isuride_core::rides::Ride;
use isuride_core::Result;

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::queries::{CHAIR_IS_AVAILABLE, LATEST_STATE_CTE};
use crate::rides::RideDB;
use crate::schema::rides;

#[derive(QueryableByName, Debug)]
struct CandidateRow {
    #[diesel(sql_type = Text)]
    id: String,
    #[diesel(sql_type = Text)]
    model: String,
    #[diesel(sql_type = Nullable<Integer>)]
    latitude: Option<i32>,
    #[diesel(sql_type = Nullable<Integer>)]
    longitude: Option<i32>,
}

impl From<CandidateRow> for ChairCandidate {
    fn from(row: CandidateRow) -> Self {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };
        Self {
            chair_id: row.id,
            model: row.model,
            location,
        }
    }
}

/// Reads and the single assignment write used by a matching pass.
///
/// Reads are plain snapshots with no locking, so two overlapping passes can
/// pick the same chair.
pub struct MatchingRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl MatchingRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        MatchingRepository { pool, writer }
    }
}

#[async_trait]
impl MatchingRepositoryTrait for MatchingRepository {
    fn find_oldest_unassigned_ride(&self) -> Result<Option<Ride>> {
        let mut conn = get_connection(&self.pool)?;
        let ride = diesel::sql_query(
            "SELECT id, user_id, chair_id, pickup_latitude, pickup_longitude,
                    destination_latitude, destination_longitude, created_at, updated_at
             FROM rides
             WHERE chair_id IS NULL
             ORDER BY created_at ASC, rowid ASC
             LIMIT 1",
        )
        .get_result::<RideDB>(&mut conn)
        .optional()
        .map_err(StorageError::from)?;
        Ok(ride.map(Ride::from))
    }

    fn find_eligible_chairs_with_latest_location(&self) -> Result<Vec<ChairCandidate>> {
        let mut conn = get_connection(&self.pool)?;
        let query = format!(
            "{}
            SELECT chairs.id AS id, chairs.model AS model,
                   latest_locations.latitude AS latitude, latest_locations.longitude AS longitude
            FROM chairs
            LEFT JOIN latest_rides ON chairs.id = latest_rides.chair_id
            LEFT JOIN latest_ride_statuses ON latest_rides.id = latest_ride_statuses.ride_id
            LEFT JOIN latest_locations ON chairs.id = latest_locations.chair_id
            WHERE {}
            ORDER BY chairs.id",
            LATEST_STATE_CTE, CHAIR_IS_AVAILABLE
        );
        let rows = diesel::sql_query(query)
            .load::<CandidateRow>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(ChairCandidate::from).collect())
    }

    async fn assign_chair_to_ride(&self, ride_id: &str, chair_id: &str) -> Result<()> {
        let ride_id_owned = ride_id.to_string();
        let chair_id_owned = chair_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let updated = diesel::update(rides::table.find(&ride_id_owned))
                    .set((
                        rides::chair_id.eq(Some(chair_id_owned)),
                        rides::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "ride {}",
                        ride_id_owned
                    ))));
                }
                Ok(())
            })
            .await
    }
}

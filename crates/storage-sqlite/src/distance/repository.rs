use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use log::info;
use std::sync::Arc;

use isuride_core::distance::{ChairTotalDistance, ChairTotalDistanceDelta, DistanceRepositoryTrait};
use isuride_core::Result;

use super::model::ChairTotalDistanceDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::chair_total_distances;
use crate::schema::chair_total_distances::dsl::*;

pub struct DistanceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DistanceRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        DistanceRepository { pool, writer }
    }
}

#[async_trait]
impl DistanceRepositoryTrait for DistanceRepository {
    async fn upsert_chair_total_distances(&self, batch: Vec<ChairTotalDistanceDelta>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for delta in batch {
                    let row: ChairTotalDistanceDB = delta.into();
                    affected_rows += diesel::insert_into(chair_total_distances::table)
                        .values(&row)
                        .on_conflict(chair_id)
                        .do_update()
                        .set((
                            total_distance.eq(total_distance + excluded(total_distance)),
                            total_distance_updated_at.eq(excluded(total_distance_updated_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected_rows)
            })
            .await
    }

    fn get_chair_total_distance(&self, chair_id_param: &str) -> Result<Option<ChairTotalDistance>> {
        let mut conn = get_connection(&self.pool)?;
        let row = chair_total_distances
            .find(chair_id_param)
            .select(ChairTotalDistanceDB::as_select())
            .first::<ChairTotalDistanceDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(ChairTotalDistance::from))
    }

    async fn rebuild_chair_total_distances(&self) -> Result<usize> {
        let written = self
            .writer
            .exec(|conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(chair_total_distances::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let written = diesel::sql_query(
                    "INSERT INTO chair_total_distances (chair_id, total_distance, total_distance_updated_at)
                     SELECT chair_id, SUM(IFNULL(distance, 0)), MAX(created_at)
                     FROM (
                         SELECT chair_id, created_at,
                                ABS(latitude - LAG(latitude) OVER w) + ABS(longitude - LAG(longitude) OVER w) AS distance
                         FROM chair_locations
                         WINDOW w AS (PARTITION BY chair_id ORDER BY created_at, rowid)
                     ) tmp
                     GROUP BY chair_id",
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(written)
            })
            .await?;
        info!("Rebuilt total distance for {} chair(s) from the location log", written);
        Ok(written)
    }
}

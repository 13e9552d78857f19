use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_types::Text;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use isuride_core::chairs::{
    Chair, ChairLocation, ChairModel, ChairRepositoryTrait, NearbyChair, NewChair, RecordedLocation,
};
use isuride_core::errors::{DatabaseError, Error};
use isuride_core::geometry::Coordinate;
use isuride_core::Result;

use super::model::{AvailableChairRow, ChairDB, ChairLocationDB, ChairModelDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::queries::{CHAIR_IS_AVAILABLE, LATEST_STATE_CTE};
use crate::schema::{chair_locations, chair_models, chairs};

pub struct ChairRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ChairRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        ChairRepository { pool, writer }
    }
}

fn chair_not_found(chair_id: &str) -> Error {
    Error::Database(DatabaseError::NotFound(format!("chair {}", chair_id)))
}

fn find_chair(conn: &mut SqliteConnection, chair_id: &str) -> Result<ChairDB> {
    chairs::table
        .find(chair_id)
        .select(ChairDB::as_select())
        .first::<ChairDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| chair_not_found(chair_id))
}

fn latest_location_on(conn: &mut SqliteConnection, chair_id: &str) -> Result<Option<ChairLocationDB>> {
    diesel::sql_query(
        "SELECT id, chair_id, latitude, longitude, created_at
         FROM chair_locations
         WHERE chair_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT 1",
    )
    .bind::<Text, _>(chair_id)
    .get_result::<ChairLocationDB>(conn)
    .optional()
    .into_core()
}

#[async_trait]
impl ChairRepositoryTrait for ChairRepository {
    fn list_chair_models(&self) -> Result<Vec<ChairModel>> {
        let mut conn = get_connection(&self.pool)?;
        let models = chair_models::table
            .order(chair_models::name.asc())
            .select(ChairModelDB::as_select())
            .load::<ChairModelDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(models.into_iter().map(ChairModel::from).collect())
    }

    fn get_chair(&self, chair_id: &str) -> Result<Chair> {
        let mut conn = get_connection(&self.pool)?;
        find_chair(&mut conn, chair_id).map(Chair::from)
    }

    async fn insert_chair(&self, new_chair: NewChair, access_token: String) -> Result<Chair> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Chair> {
                let now = Utc::now().naive_utc();
                let chair_db = ChairDB {
                    id: Uuid::new_v4().to_string(),
                    owner_id: new_chair.owner_id,
                    name: new_chair.name,
                    model: new_chair.model,
                    is_active: false,
                    access_token,
                    created_at: now,
                    updated_at: now,
                };

                let result_db = diesel::insert_into(chairs::table)
                    .values(&chair_db)
                    .returning(ChairDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Chair::from(result_db))
            })
            .await
    }

    async fn set_chair_active(&self, chair_id: &str, is_active: bool) -> Result<Chair> {
        let chair_id_owned = chair_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Chair> {
                let updated = diesel::update(chairs::table.find(&chair_id_owned))
                    .set((
                        chairs::is_active.eq(is_active),
                        chairs::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(chair_not_found(&chair_id_owned));
                }
                find_chair(conn, &chair_id_owned).map(Chair::from)
            })
            .await
    }

    async fn record_location(&self, chair_id: &str, coordinate: Coordinate) -> Result<RecordedLocation> {
        let chair_id_owned = chair_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<RecordedLocation> {
                find_chair(conn, &chair_id_owned)?;
                let previous = latest_location_on(conn, &chair_id_owned)?.map(|row| row.coordinate());

                let location_db = ChairLocationDB {
                    id: Uuid::new_v4().to_string(),
                    chair_id: chair_id_owned,
                    latitude: coordinate.latitude,
                    longitude: coordinate.longitude,
                    created_at: Utc::now().naive_utc(),
                };
                diesel::insert_into(chair_locations::table)
                    .values(&location_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(RecordedLocation {
                    location: ChairLocation::from(location_db),
                    previous,
                })
            })
            .await
    }

    fn latest_location(&self, chair_id: &str) -> Result<Option<ChairLocation>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(latest_location_on(&mut conn, chair_id)?.map(ChairLocation::from))
    }

    fn list_available_chairs_with_location(&self) -> Result<Vec<NearbyChair>> {
        let mut conn = get_connection(&self.pool)?;
        let query = format!(
            "{}
            SELECT chairs.id AS id, chairs.name AS name, chairs.model AS model,
                   latest_locations.latitude AS latitude, latest_locations.longitude AS longitude
            FROM chairs
            INNER JOIN latest_locations ON chairs.id = latest_locations.chair_id
            LEFT JOIN latest_rides ON chairs.id = latest_rides.chair_id
            LEFT JOIN latest_ride_statuses ON latest_rides.id = latest_ride_statuses.ride_id
            WHERE {}
            ORDER BY chairs.id",
            LATEST_STATE_CTE, CHAIR_IS_AVAILABLE
        );
        let rows = diesel::sql_query(query)
            .load::<AvailableChairRow>(&mut conn)
            .map_err(StorageError::from)?;
        debug!("{} available chair(s) with a known location", rows.len());
        Ok(rows.into_iter().map(NearbyChair::from).collect())
    }
}

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_types::Text;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use isuride_core::errors::{DatabaseError, Error};
use isuride_core::rides::{
    check_transition, NewRide, Ride, RideRepositoryTrait, RideStatus, RideStatusRecord, StatusTransition,
};
use isuride_core::Result;

use super::model::{RideDB, RideStatusDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{ride_statuses, rides};

pub struct RideRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RideRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        RideRepository { pool, writer }
    }
}

fn find_ride(conn: &mut SqliteConnection, ride_id: &str) -> Result<RideDB> {
    rides::table
        .find(ride_id)
        .select(RideDB::as_select())
        .first::<RideDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("ride {}", ride_id))))
}

fn append_status(conn: &mut SqliteConnection, ride_id: String, status: RideStatus) -> Result<RideStatusDB> {
    let status_db = RideStatusDB {
        id: Uuid::new_v4().to_string(),
        ride_id,
        status: status.as_str().to_string(),
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(ride_statuses::table)
        .values(&status_db)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(status_db)
}

fn latest_status_on(conn: &mut SqliteConnection, ride_id: &str) -> Result<Option<RideStatusDB>> {
    diesel::sql_query(
        "SELECT id, ride_id, status, created_at
         FROM ride_statuses
         WHERE ride_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT 1",
    )
    .bind::<Text, _>(ride_id)
    .get_result::<RideStatusDB>(conn)
    .optional()
    .into_core()
}

#[async_trait]
impl RideRepositoryTrait for RideRepository {
    async fn insert_ride(&self, new_ride: NewRide) -> Result<Ride> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Ride> {
                let now = Utc::now().naive_utc();
                let ride_db = RideDB {
                    id: Uuid::new_v4().to_string(),
                    user_id: new_ride.user_id,
                    chair_id: None,
                    pickup_latitude: new_ride.pickup.latitude,
                    pickup_longitude: new_ride.pickup.longitude,
                    destination_latitude: new_ride.destination.latitude,
                    destination_longitude: new_ride.destination.longitude,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(rides::table)
                    .values(&ride_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_status(conn, ride_db.id.clone(), RideStatus::Matching)?;
                Ok(Ride::from(ride_db))
            })
            .await
    }

    fn get_ride(&self, ride_id: &str) -> Result<Ride> {
        let mut conn = get_connection(&self.pool)?;
        find_ride(&mut conn, ride_id).map(Ride::from)
    }

    fn latest_status(&self, ride_id: &str) -> Result<Option<RideStatusRecord>> {
        let mut conn = get_connection(&self.pool)?;
        latest_status_on(&mut conn, ride_id)?
            .map(RideStatusRecord::try_from)
            .transpose()
    }

    async fn transition_status(&self, ride_id: &str, next: RideStatus) -> Result<StatusTransition> {
        let ride_id_owned = ride_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<StatusTransition> {
                let ride = Ride::from(find_ride(conn, &ride_id_owned)?);
                let from = match latest_status_on(conn, &ride_id_owned)? {
                    Some(latest) => RideStatusRecord::try_from(latest)?.status,
                    None => RideStatus::Matching,
                };
                check_transition(&ride, from, next)?;
                let record = RideStatusRecord::try_from(append_status(conn, ride_id_owned, next)?)?;
                Ok(StatusTransition { ride, from, record })
            })
            .await
    }
}

//! Database models for rides.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use isuride_core::errors::Error;
use isuride_core::geometry::Coordinate;
use isuride_core::rides::{Ride, RideStatusRecord};

/// Database model for rides
#[derive(
    Queryable, QueryableByName, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq,
)]
#[diesel(table_name = crate::schema::rides)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RideDB {
    pub id: String,
    pub user_id: String,
    pub chair_id: Option<String>,
    pub pickup_latitude: i32,
    pub pickup_longitude: i32,
    pub destination_latitude: i32,
    pub destination_longitude: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<RideDB> for Ride {
    fn from(db: RideDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            chair_id: db.chair_id,
            pickup: Coordinate::new(db.pickup_latitude, db.pickup_longitude),
            destination: Coordinate::new(db.destination_latitude, db.destination_longitude),
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        }
    }
}

/// Database model for one ride status record
#[derive(Queryable, QueryableByName, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ride_statuses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RideStatusDB {
    pub id: String,
    pub ride_id: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<RideStatusDB> for RideStatusRecord {
    type Error = Error;

    fn try_from(db: RideStatusDB) -> Result<Self, Self::Error> {
        Ok(Self {
            status: db.status.parse()?,
            id: db.id,
            ride_id: db.ride_id,
            created_at: db.created_at.and_utc(),
        })
    }
}

//! Database models for chairs.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use isuride_core::chairs::{Chair, ChairLocation, ChairModel, NearbyChair};
use isuride_core::geometry::Coordinate;

/// Database model for chair models
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chair_models)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChairModelDB {
    pub name: String,
    pub speed: i32,
}

impl From<ChairModelDB> for ChairModel {
    fn from(db: ChairModelDB) -> Self {
        Self {
            name: db.name,
            speed: db.speed,
        }
    }
}

/// Database model for chairs
#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chairs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChairDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    pub access_token: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ChairDB> for Chair {
    fn from(db: ChairDB) -> Self {
        Self {
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            model: db.model,
            is_active: db.is_active,
            access_token: db.access_token,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        }
    }
}

/// Database model for one chair location sample
#[derive(Queryable, QueryableByName, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chair_locations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChairLocationDB {
    pub id: String,
    pub chair_id: String,
    pub latitude: i32,
    pub longitude: i32,
    pub created_at: NaiveDateTime,
}

impl ChairLocationDB {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl From<ChairLocationDB> for ChairLocation {
    fn from(db: ChairLocationDB) -> Self {
        Self {
            coordinate: db.coordinate(),
            id: db.id,
            chair_id: db.chair_id,
            created_at: db.created_at.and_utc(),
        }
    }
}

/// Row of the available-chairs query.
#[derive(QueryableByName, Debug, Clone)]
pub struct AvailableChairRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub name: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub model: String,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub latitude: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub longitude: i32,
}

impl From<AvailableChairRow> for NearbyChair {
    fn from(row: AvailableChairRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            model: row.model,
            current_coordinate: Coordinate::new(row.latitude, row.longitude),
        }
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use isuride_core::{
    chairs::{Chair, NewChair},
    geometry::Coordinate,
    rides::{RideStatus, RideStatusRecord},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

/// The only response that carries the access token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChairRegistration {
    pub id: String,
    pub owner_id: String,
    pub access_token: String,
}

impl From<Chair> for ChairRegistration {
    fn from(chair: Chair) -> Self {
        Self {
            id: chair.id,
            owner_id: chair.owner_id,
            access_token: chair.access_token,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub is_active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateResponse {
    pub recorded_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalDistanceResponse {
    pub chair_id: String,
    pub total_distance: i64,
    pub total_distance_updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: RideStatus,
}

async fn register_chair(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewChair>,
) -> ApiResult<(StatusCode, Json<ChairRegistration>)> {
    let chair = state.chair_service.register_chair(payload).await?;
    Ok((StatusCode::CREATED, Json(ChairRegistration::from(chair))))
}

async fn get_chair(
    Path(chair_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Chair>> {
    Ok(Json(state.chair_service.get_chair(&chair_id)?))
}

async fn set_activity(
    Path(chair_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActivityRequest>,
) -> ApiResult<StatusCode> {
    state
        .chair_service
        .set_active(&chair_id, payload.is_active)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_coordinate(
    Path(chair_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(coordinate): Json<Coordinate>,
) -> ApiResult<Json<CoordinateResponse>> {
    let location = state
        .location_service
        .record_location(&chair_id, coordinate)
        .await?;
    Ok(Json(CoordinateResponse {
        recorded_at: location.created_at,
    }))
}

async fn get_total_distance(
    Path(chair_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TotalDistanceResponse>> {
    let total = state.chair_service.get_total_distance(&chair_id)?;
    let response = match total {
        Some(total) => TotalDistanceResponse {
            chair_id: total.chair_id,
            total_distance: total.total_distance,
            total_distance_updated_at: Some(total.total_distance_updated_at),
        },
        None => TotalDistanceResponse {
            chair_id,
            total_distance: 0,
            total_distance_updated_at: None,
        },
    };
    Ok(Json(response))
}

async fn post_ride_status(
    Path(ride_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<RideStatusRecord>> {
    let record = state
        .ride_service
        .update_status(&ride_id, payload.status)
        .await?;
    Ok(Json(record))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chairs", post(register_chair))
        .route("/chairs/{chair_id}", get(get_chair))
        .route("/chairs/{chair_id}/activity", post(set_activity))
        .route("/chairs/{chair_id}/coordinate", post(post_coordinate))
        .route("/chairs/{chair_id}/total-distance", get(get_total_distance))
        .route("/rides/{ride_id}/status", post(post_ride_status))
}

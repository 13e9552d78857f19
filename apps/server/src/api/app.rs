use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use isuride_core::{
    chairs::NearbyChair,
    geometry::Coordinate,
    rides::{NewRide, Ride, RideStatus},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

const DEFAULT_NEARBY_DISTANCE: i64 = 50;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideView {
    #[serde(flatten)]
    pub ride: Ride,
    pub status: RideStatus,
}

#[derive(Deserialize)]
pub struct NearbyChairsQuery {
    pub latitude: i32,
    pub longitude: i32,
    pub distance: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyChairsResponse {
    pub chairs: Vec<NearbyChair>,
    pub retrieved_at: DateTime<Utc>,
}

async fn create_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewRide>,
) -> ApiResult<(StatusCode, Json<RideView>)> {
    let ride = state.ride_service.create_ride(payload).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RideView {
            ride,
            status: RideStatus::Matching,
        }),
    ))
}

async fn get_ride(
    Path(ride_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RideView>> {
    let ride = state.ride_service.get_ride(&ride_id)?;
    let status = state.ride_service.current_status(&ride_id)?;
    Ok(Json(RideView { ride, status }))
}

async fn nearby_chairs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyChairsQuery>,
) -> ApiResult<Json<NearbyChairsResponse>> {
    let center = Coordinate::new(query.latitude, query.longitude);
    let distance = query.distance.unwrap_or(DEFAULT_NEARBY_DISTANCE);
    let chairs = state.chair_service.nearby_chairs(center, distance)?;
    Ok(Json(NearbyChairsResponse {
        chairs,
        retrieved_at: Utc::now(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(create_ride))
        .route("/rides/{ride_id}", get(get_ride))
        .route("/nearby-chairs", get(nearby_chairs))
}

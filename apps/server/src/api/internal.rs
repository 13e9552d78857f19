use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use isuride_core::{
    matching::MatchResult,
    notifications::{chair_topic, RideStatusEventData},
    rides::RideStatus,
};

use crate::{error::ApiResult, main_lib::AppState};

/// Runs one matching pass and tells the assigned chair about its new ride.
///
/// The matcher itself never publishes; this adapter announces the assignment
/// on the chair topic so a connected chair stream learns it has work.
pub async fn dispatch_once(state: &AppState) -> isuride_core::Result<MatchResult> {
    let result = state.matching_service.run_matching_pass().await?;

    if let MatchResult::Matched {
        ride_id, chair_id, ..
    } = &result
    {
        match state.ride_service.get_ride(ride_id) {
            Ok(ride) => {
                state.bus.publish(
                    &chair_topic(chair_id),
                    RideStatusEventData {
                        ride,
                        status: RideStatus::Matching,
                    },
                );
            }
            Err(err) => {
                tracing::warn!("Matched ride {} but could not load it: {}", ride_id, err)
            }
        }
    }

    Ok(result)
}

// 204 for every outcome, including "nothing to match"; failures go through
// ApiError so retryable ones surface as 503.
async fn trigger_matching(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    dispatch_once(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/matching", get(trigger_matching))
}

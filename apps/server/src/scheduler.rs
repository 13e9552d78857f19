//! Background trigger for periodic dispatch matching.
//!
//! Only started when `ISURIDE_MATCHING_INTERVAL_MS` is set; otherwise passes
//! run when something calls `GET /api/internal/matching`.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use isuride_core::matching::MatchResult;

use crate::api::internal::dispatch_once;
use crate::main_lib::AppState;

/// Starts the matching scheduler. Passes never overlap: the next tick waits
/// for the previous pass to return.
pub fn start_matching_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        info!("Matching scheduler started ({:?} interval)", every);

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_scheduled_matching(&state).await;
        }
    });
}

async fn run_scheduled_matching(state: &Arc<AppState>) {
    match dispatch_once(state).await {
        Ok(MatchResult::Matched { .. }) => {}
        Ok(other) => debug!("Scheduled matching pass: {:?}", other),
        Err(err) if err.is_retryable() => {
            warn!("Scheduled matching pass failed, will retry next tick: {}", err)
        }
        Err(err) => warn!("Scheduled matching pass failed: {}", err),
    }
}

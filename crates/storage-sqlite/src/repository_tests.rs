use std::sync::Arc;

use chrono::{TimeZone, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use tempfile::tempdir;

use isuride_core::chairs::{Chair, ChairModelCatalog, ChairRepositoryTrait, NewChair};
use isuride_core::distance::{ChairTotalDistanceDelta, DistanceRepositoryTrait};
use isuride_core::errors::Error;
use isuride_core::geometry::Coordinate;
use isuride_core::matching::{MatchResult, MatchingRepositoryTrait, MatchingService, MatchingServiceTrait};
use isuride_core::rides::{NewRide, Ride, RideRepositoryTrait, RideStatus};
use tokio::sync::Barrier;

use crate::chairs::ChairRepository;
use crate::db::{create_pool, init, run_migrations, write_actor::spawn_writer, WriteHandle};
use crate::distance::DistanceRepository;
use crate::matching::MatchingRepository;
use crate::rides::RideRepository;
use crate::schema::ride_statuses;

struct TestStore {
    chairs: ChairRepository,
    rides: RideRepository,
    matching: MatchingRepository,
    distances: DistanceRepository,
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
    _temp_dir: tempfile::TempDir,
}

/// Creates every repository over a fresh, migrated database in a temp dir.
fn create_test_store() -> TestStore {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("db").join("test.db");
    let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");

    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());

    TestStore {
        chairs: ChairRepository::new(Arc::clone(&pool), writer.clone()),
        rides: RideRepository::new(Arc::clone(&pool), writer.clone()),
        matching: MatchingRepository::new(Arc::clone(&pool), writer.clone()),
        distances: DistanceRepository::new(Arc::clone(&pool), writer.clone()),
        pool,
        writer,
        _temp_dir: temp_dir,
    }
}

async fn create_active_chair(store: &TestStore, name: &str, model: &str, token: &str) -> Chair {
    let chair = store
        .chairs
        .insert_chair(
            NewChair {
                owner_id: "owner-1".to_string(),
                name: name.to_string(),
                model: model.to_string(),
            },
            token.to_string(),
        )
        .await
        .expect("Failed to insert chair");
    store
        .chairs
        .set_chair_active(&chair.id, true)
        .await
        .expect("Failed to activate chair")
}

async fn create_ride(store: &TestStore, pickup: (i32, i32), destination: (i32, i32)) -> Ride {
    store
        .rides
        .insert_ride(NewRide {
            user_id: "user-1".to_string(),
            pickup: Coordinate::new(pickup.0, pickup.1),
            destination: Coordinate::new(destination.0, destination.1),
        })
        .await
        .expect("Failed to insert ride")
}

async fn complete_ride(store: &TestStore, ride_id: &str) {
    for status in [
        RideStatus::Enroute,
        RideStatus::Pickup,
        RideStatus::Carrying,
        RideStatus::Arrived,
        RideStatus::Completed,
    ] {
        store
            .rides
            .transition_status(ride_id, status)
            .await
            .expect("Failed to apply status");
    }
}

// ==================== Chairs ====================

#[tokio::test]
async fn test_migrations_seed_chair_models() {
    let store = create_test_store();

    let models = store.chairs.list_chair_models().unwrap();
    assert_eq!(models.len(), 16);
    assert!(models.iter().all(|m| m.speed > 0));

    let catalog = ChairModelCatalog::new(models);
    assert_eq!(catalog.speed_of("AeroSeat").unwrap(), 3);
    assert_eq!(catalog.speed_of("Legacy Chair").unwrap(), 7);
}

#[tokio::test]
async fn test_insert_and_activate_chair() {
    let store = create_test_store();

    let chair = store
        .chairs
        .insert_chair(
            NewChair {
                owner_id: "owner-1".to_string(),
                name: "QC-L13-8361".to_string(),
                model: "AeroSeat".to_string(),
            },
            "token-1".to_string(),
        )
        .await
        .unwrap();
    assert!(!chair.is_active);
    assert_eq!(store.chairs.get_chair(&chair.id).unwrap().access_token, "token-1");

    let activated = store.chairs.set_chair_active(&chair.id, true).await.unwrap();
    assert!(activated.is_active);

    assert!(store.chairs.get_chair("missing").unwrap_err().is_not_found());
    assert!(store
        .chairs
        .set_chair_active("missing", true)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_insert_chair_with_unknown_model_fails() {
    let store = create_test_store();
    let result = store
        .chairs
        .insert_chair(
            NewChair {
                owner_id: "owner-1".to_string(),
                name: "x".to_string(),
                model: "Hover".to_string(),
            },
            "token-x".to_string(),
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_record_location_returns_previous_sample() {
    let store = create_test_store();
    let chair = create_active_chair(&store, "c", "AeroSeat", "t").await;

    let first = store
        .chairs
        .record_location(&chair.id, Coordinate::new(1, 2))
        .await
        .unwrap();
    assert_eq!(first.previous, None);

    let second = store
        .chairs
        .record_location(&chair.id, Coordinate::new(4, 6))
        .await
        .unwrap();
    assert_eq!(second.previous, Some(Coordinate::new(1, 2)));
    assert_eq!(second.location.coordinate, Coordinate::new(4, 6));

    let latest = store.chairs.latest_location(&chair.id).unwrap().unwrap();
    assert_eq!(latest.id, second.location.id);

    assert!(store
        .chairs
        .record_location("missing", Coordinate::new(0, 0))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_available_chairs_require_location_and_freedom() {
    let store = create_test_store();
    let located = create_active_chair(&store, "located", "AeroSeat", "t1").await;
    let _unlocated = create_active_chair(&store, "unlocated", "AeroSeat", "t2").await;
    let busy = create_active_chair(&store, "busy", "AeroSeat", "t3").await;
    store.chairs.record_location(&located.id, Coordinate::new(5, 5)).await.unwrap();
    store.chairs.record_location(&busy.id, Coordinate::new(6, 6)).await.unwrap();

    let ride = create_ride(&store, (0, 0), (1, 1)).await;
    store.matching.assign_chair_to_ride(&ride.id, &busy.id).await.unwrap();

    let available = store.chairs.list_available_chairs_with_location().unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, located.id);
    assert_eq!(available[0].current_coordinate, Coordinate::new(5, 5));
}

// ==================== Rides ====================

#[tokio::test]
async fn test_insert_ride_starts_matching() {
    let store = create_test_store();
    let ride = create_ride(&store, (0, 0), (10, 10)).await;

    let fetched = store.rides.get_ride(&ride.id).unwrap();
    assert_eq!(fetched.chair_id, None);
    assert_eq!(fetched.destination, Coordinate::new(10, 10));

    let status = store.rides.latest_status(&ride.id).unwrap().unwrap();
    assert_eq!(status.status, RideStatus::Matching);
}

#[tokio::test]
async fn test_latest_status_follows_transitions() {
    let store = create_test_store();
    let ride = create_ride(&store, (0, 0), (10, 10)).await;
    let chair = create_active_chair(&store, "c", "AeroSeat", "t").await;
    store.matching.assign_chair_to_ride(&ride.id, &chair.id).await.unwrap();

    let enroute = store.rides.transition_status(&ride.id, RideStatus::Enroute).await.unwrap();
    assert_eq!(enroute.from, RideStatus::Matching);
    assert_eq!(enroute.ride.chair_id.as_deref(), Some(chair.id.as_str()));
    let pickup = store.rides.transition_status(&ride.id, RideStatus::Pickup).await.unwrap();
    assert_eq!(pickup.from, RideStatus::Enroute);

    let status = store.rides.latest_status(&ride.id).unwrap().unwrap();
    assert_eq!(status.status, RideStatus::Pickup);
    assert_eq!(status.id, pickup.record.id);

    assert!(store.rides.latest_status("missing").unwrap().is_none());
    assert!(store
        .rides
        .transition_status("missing", RideStatus::Enroute)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_transition_rejected_inside_write() {
    let store = create_test_store();
    let ride = create_ride(&store, (0, 0), (10, 10)).await;

    // No chair yet.
    let err = store
        .rides
        .transition_status(&ride.id, RideStatus::Enroute)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let chair = create_active_chair(&store, "c", "AeroSeat", "t").await;
    store.matching.assign_chair_to_ride(&ride.id, &chair.id).await.unwrap();
    let err = store
        .rides
        .transition_status(&ride.id, RideStatus::Arrived)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { from: RideStatus::Matching, .. }));

    let status = store.rides.latest_status(&ride.id).unwrap().unwrap();
    assert_eq!(status.status, RideStatus::Matching);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_transitions_apply_once() {
    const TASKS: usize = 8;
    let store = create_test_store();
    let chair = create_active_chair(&store, "c", "AeroSeat", "t").await;
    let rides = Arc::new(RideRepository::new(Arc::clone(&store.pool), store.writer.clone()));

    for _ in 0..50 {
        let ride = create_ride(&store, (0, 0), (10, 10)).await;
        store.matching.assign_chair_to_ride(&ride.id, &chair.id).await.unwrap();

        let barrier = Arc::new(Barrier::new(TASKS));
        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let rides = Arc::clone(&rides);
                let barrier = Arc::clone(&barrier);
                let ride_id = ride.id.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    rides.transition_status(&ride_id, RideStatus::Enroute).await
                })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(transition) => {
                    assert_eq!(transition.from, RideStatus::Matching);
                    applied += 1;
                }
                Err(err) => assert!(
                    matches!(err, Error::InvalidTransition { from: RideStatus::Enroute, .. }),
                    "unexpected error: {:?}",
                    err
                ),
            }
        }
        assert_eq!(applied, 1);

        let mut conn = store.pool.get().unwrap();
        let logged: i64 = ride_statuses::table
            .filter(ride_statuses::ride_id.eq(&ride.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(logged, 2);
    }
}

// ==================== Matching ====================

#[tokio::test]
async fn test_oldest_unassigned_ride_first() {
    let store = create_test_store();
    assert!(store.matching.find_oldest_unassigned_ride().unwrap().is_none());

    let first = create_ride(&store, (0, 0), (1, 1)).await;
    let second = create_ride(&store, (2, 2), (3, 3)).await;
    assert_eq!(
        store.matching.find_oldest_unassigned_ride().unwrap().unwrap().id,
        first.id
    );

    let chair = create_active_chair(&store, "c", "AeroSeat", "t").await;
    store.matching.assign_chair_to_ride(&first.id, &chair.id).await.unwrap();
    assert_eq!(
        store.matching.find_oldest_unassigned_ride().unwrap().unwrap().id,
        second.id
    );
    assert_eq!(store.rides.get_ride(&first.id).unwrap().chair_id, Some(chair.id));
}

#[tokio::test]
async fn test_eligible_chairs_follow_ride_lifecycle() {
    let store = create_test_store();
    let chair = create_active_chair(&store, "c", "AeroSeat", "t1").await;
    let idle = store
        .chairs
        .insert_chair(
            NewChair {
                owner_id: "owner-1".to_string(),
                name: "idle".to_string(),
                model: "AeroSeat".to_string(),
            },
            "t2".to_string(),
        )
        .await
        .unwrap();

    // Never assigned and no location yet: eligible, location unknown.
    let candidates = store.matching.find_eligible_chairs_with_latest_location().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].chair_id, chair.id);
    assert_eq!(candidates[0].location, None);
    assert!(candidates.iter().all(|c| c.chair_id != idle.id));

    store.chairs.record_location(&chair.id, Coordinate::new(3, 3)).await.unwrap();
    let ride = create_ride(&store, (0, 0), (1, 1)).await;
    store.matching.assign_chair_to_ride(&ride.id, &chair.id).await.unwrap();
    assert!(store
        .matching
        .find_eligible_chairs_with_latest_location()
        .unwrap()
        .is_empty());

    complete_ride(&store, &ride.id).await;
    let candidates = store.matching.find_eligible_chairs_with_latest_location().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].location, Some(Coordinate::new(3, 3)));
}

#[tokio::test]
async fn test_eligible_chairs_ordered_by_id() {
    let store = create_test_store();
    for i in 0..5 {
        create_active_chair(&store, &format!("c{}", i), "AeroSeat", &format!("t{}", i)).await;
    }

    let ids: Vec<String> = store
        .matching
        .find_eligible_chairs_with_latest_location()
        .unwrap()
        .into_iter()
        .map(|c| c.chair_id)
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids.len(), 5);
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn test_matching_pass_against_sqlite() {
    let store = create_test_store();
    let catalog = Arc::new(ChairModelCatalog::new(store.chairs.list_chair_models().unwrap()));

    let r1 = create_ride(&store, (10, 10), (20, 20)).await;
    let r2 = create_ride(&store, (-30, -30), (-40, -40)).await;
    // Legacy Chair: speed 7, next to the pickup. ComfortBasic: speed 2, far away.
    let near = create_active_chair(&store, "near", "Legacy Chair", "t1").await;
    let far = create_active_chair(&store, "far", "ComfortBasic", "t2").await;
    store.chairs.record_location(&near.id, Coordinate::new(10, 11)).await.unwrap();
    store.chairs.record_location(&far.id, Coordinate::new(90, 90)).await.unwrap();

    let repository = MatchingRepository::new(Arc::clone(&store.pool), store.writer.clone());
    let service = MatchingService::new(Arc::new(repository), catalog);

    match service.run_matching_pass().await.unwrap() {
        MatchResult::Matched { ride_id, chair_id, .. } => {
            assert_eq!(ride_id, r1.id);
            assert_eq!(chair_id, near.id);
        }
        other => panic!("expected a match, got {:?}", other),
    }
    assert_eq!(store.rides.get_ride(&r2.id).unwrap().chair_id, None);

    match service.run_matching_pass().await.unwrap() {
        MatchResult::Matched { ride_id, chair_id, .. } => {
            assert_eq!(ride_id, r2.id);
            assert_eq!(chair_id, far.id);
        }
        other => panic!("expected a match, got {:?}", other),
    }
    assert_eq!(service.run_matching_pass().await.unwrap(), MatchResult::NoUnassignedRide);
}

// ==================== Distances ====================

fn delta(chair_id: &str, distance: i64, secs: i64) -> ChairTotalDistanceDelta {
    ChairTotalDistanceDelta {
        chair_id: chair_id.to_string(),
        distance,
        updated_at: Utc.with_ymd_and_hms(2024, 11, 1, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs),
    }
}

#[tokio::test]
async fn test_upsert_accumulates_totals() {
    let store = create_test_store();
    let a = create_active_chair(&store, "a", "AeroSeat", "t1").await;
    let b = create_active_chair(&store, "b", "AeroSeat", "t2").await;

    store
        .distances
        .upsert_chair_total_distances(vec![delta(&a.id, 100, 0), delta(&b.id, 10, 0)])
        .await
        .unwrap();
    let written = store
        .distances
        .upsert_chair_total_distances(vec![delta(&a.id, 8, 5), delta(&b.id, 2, 6)])
        .await
        .unwrap();
    assert_eq!(written, 2);

    let total_a = store.distances.get_chair_total_distance(&a.id).unwrap().unwrap();
    assert_eq!(total_a.total_distance, 108);
    assert_eq!(total_a.total_distance_updated_at, delta(&a.id, 0, 5).updated_at);
    let total_b = store.distances.get_chair_total_distance(&b.id).unwrap().unwrap();
    assert_eq!(total_b.total_distance, 12);

    assert!(store.distances.get_chair_total_distance("missing").unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_batch_is_atomic() {
    let store = create_test_store();
    let a = create_active_chair(&store, "a", "AeroSeat", "t1").await;

    // The unknown chair violates the foreign key and rolls back the whole batch.
    let result = store
        .distances
        .upsert_chair_total_distances(vec![delta(&a.id, 5, 0), delta("missing", 1, 0)])
        .await;
    assert!(result.is_err());
    assert!(store.distances.get_chair_total_distance(&a.id).unwrap().is_none());
}

#[tokio::test]
async fn test_rebuild_totals_from_location_log() {
    let store = create_test_store();
    let a = create_active_chair(&store, "a", "AeroSeat", "t1").await;
    let b = create_active_chair(&store, "b", "AeroSeat", "t2").await;
    for (lat, lon) in [(0, 0), (3, 4), (3, 4), (1, 4)] {
        store.chairs.record_location(&a.id, Coordinate::new(lat, lon)).await.unwrap();
    }
    store.chairs.record_location(&b.id, Coordinate::new(9, 9)).await.unwrap();
    store
        .distances
        .upsert_chair_total_distances(vec![delta(&a.id, 1000, 0)])
        .await
        .unwrap();

    let written = store.distances.rebuild_chair_total_distances().await.unwrap();
    assert_eq!(written, 2);
    assert_eq!(
        store.distances.get_chair_total_distance(&a.id).unwrap().unwrap().total_distance,
        9
    );
    assert_eq!(
        store.distances.get_chair_total_distance(&b.id).unwrap().unwrap().total_distance,
        0
    );
}

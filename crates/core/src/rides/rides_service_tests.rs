#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result};
    use crate::geometry::Coordinate;
    use crate::notifications::{chair_topic, ride_topic, NotificationBus, RideStatusEvent};
    use crate::rides::{
        check_transition, NewRide, Ride, RideRepositoryTrait, RideService, RideServiceTrait,
        RideStatus, RideStatusRecord, StatusTransition,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::mpsc;

    // --- Mock RideRepository ---
    #[derive(Clone, Default)]
    struct MockRideRepository {
        rides: Arc<Mutex<Vec<Ride>>>,
        statuses: Arc<Mutex<Vec<RideStatusRecord>>>,
    }

    fn push_status(
        statuses: &mut Vec<RideStatusRecord>,
        ride_id: &str,
        status: RideStatus,
    ) -> RideStatusRecord {
        let record = RideStatusRecord {
            id: format!("status-{}", statuses.len() + 1),
            ride_id: ride_id.to_string(),
            status,
            created_at: Utc::now(),
        };
        statuses.push(record.clone());
        record
    }

    impl MockRideRepository {
        fn assign(&self, ride_id: &str, chair_id: &str) {
            let mut rides = self.rides.lock().unwrap();
            if let Some(ride) = rides.iter_mut().find(|r| r.id == ride_id) {
                ride.chair_id = Some(chair_id.to_string());
            }
        }

        fn status_log(&self, ride_id: &str) -> Vec<RideStatus> {
            self.statuses
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.ride_id == ride_id)
                .map(|s| s.status)
                .collect()
        }
    }

    #[async_trait]
    impl RideRepositoryTrait for MockRideRepository {
        async fn insert_ride(&self, new_ride: NewRide) -> Result<Ride> {
            let now = Utc::now();
            let id = format!("ride-{}", self.rides.lock().unwrap().len() + 1);
            let ride = Ride {
                id: id.clone(),
                user_id: new_ride.user_id,
                chair_id: None,
                pickup: new_ride.pickup,
                destination: new_ride.destination,
                created_at: now,
                updated_at: now,
            };
            self.rides.lock().unwrap().push(ride.clone());
            push_status(&mut self.statuses.lock().unwrap(), &id, RideStatus::Matching);
            Ok(ride)
        }

        fn get_ride(&self, ride_id: &str) -> Result<Ride> {
            self.rides
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == ride_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("ride {}", ride_id))))
        }

        fn latest_status(&self, ride_id: &str) -> Result<Option<RideStatusRecord>> {
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|s| s.ride_id == ride_id)
                .cloned())
        }

        async fn transition_status(
            &self,
            ride_id: &str,
            next: RideStatus,
        ) -> Result<StatusTransition> {
            // One lock spans the read and the append, like the storage transaction.
            let mut statuses = self.statuses.lock().unwrap();
            let ride = self.get_ride(ride_id)?;
            let from = statuses
                .iter()
                .rev()
                .find(|s| s.ride_id == ride_id)
                .map_or(RideStatus::Matching, |s| s.status);
            check_transition(&ride, from, next)?;
            let record = push_status(&mut statuses, ride_id, next);
            Ok(StatusTransition { ride, from, record })
        }
    }

    fn new_ride() -> NewRide {
        NewRide {
            user_id: "user-1".to_string(),
            pickup: Coordinate::new(0, 0),
            destination: Coordinate::new(3, 4),
        }
    }

    fn setup() -> (MockRideRepository, Arc<NotificationBus>, RideService) {
        let repo = MockRideRepository::default();
        let bus = Arc::new(NotificationBus::new());
        let service = RideService::new(Arc::new(repo.clone()), bus.clone());
        (repo, bus, service)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<Arc<RideStatusEvent>>) -> Arc<RideStatusEvent> {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event not delivered in time")
            .expect("sink closed")
    }

    #[tokio::test]
    async fn test_create_ride_records_matching() {
        let (repo, _bus, service) = setup();

        let ride = service.create_ride(new_ride()).await.unwrap();
        assert!(ride.chair_id.is_none());
        assert_eq!(repo.status_log(&ride.id), vec![RideStatus::Matching]);
        assert_eq!(service.current_status(&ride.id).unwrap(), RideStatus::Matching);
    }

    #[tokio::test]
    async fn test_create_ride_rejects_invalid_input() {
        let (_repo, _bus, service) = setup();
        let mut input = new_ride();
        input.destination = input.pickup;

        let err = service.create_ride(input).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_requires_assigned_chair() {
        let (repo, _bus, service) = setup();
        let ride = service.create_ride(new_ride()).await.unwrap();

        let err = service.update_status(&ride.id, RideStatus::Enroute).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(repo.status_log(&ride.id), vec![RideStatus::Matching]);
    }

    #[tokio::test]
    async fn test_update_rejects_skipped_status() {
        let (repo, _bus, service) = setup();
        let ride = service.create_ride(new_ride()).await.unwrap();
        repo.assign(&ride.id, "chair-1");

        let err = service.update_status(&ride.id, RideStatus::Carrying).await.unwrap_err();
        match err {
            Error::InvalidTransition { from, to, .. } => {
                assert_eq!(from, RideStatus::Matching);
                assert_eq!(to, RideStatus::Carrying);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_publishes_to_ride_and_chair_topics() {
        let (repo, bus, service) = setup();
        let ride = service.create_ride(new_ride()).await.unwrap();
        repo.assign(&ride.id, "chair-1");

        let (ride_tx, mut ride_rx) = mpsc::unbounded_channel::<Arc<RideStatusEvent>>();
        let (chair_tx, mut chair_rx) = mpsc::unbounded_channel::<Arc<RideStatusEvent>>();
        bus.subscribe(ride_topic(&ride.id), Arc::new(ride_tx));
        bus.subscribe(chair_topic("chair-1"), Arc::new(chair_tx));

        let record = service.update_status(&ride.id, RideStatus::Enroute).await.unwrap();
        assert_eq!(record.status, RideStatus::Enroute);

        let on_ride = recv(&mut ride_rx).await;
        assert_eq!(on_ride.data.status, RideStatus::Enroute);
        assert_eq!(on_ride.data.ride.chair_id.as_deref(), Some("chair-1"));
        let on_chair = recv(&mut chair_rx).await;
        assert_eq!(on_chair.topic, chair_topic("chair-1"));
        assert_eq!(on_chair.data.status, RideStatus::Enroute);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (repo, bus, service) = setup();
        let ride = service.create_ride(new_ride()).await.unwrap();
        repo.assign(&ride.id, "chair-1");
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<RideStatusEvent>>();
        bus.subscribe(ride_topic(&ride.id), Arc::new(tx));

        let steps = [
            RideStatus::Enroute,
            RideStatus::Pickup,
            RideStatus::Carrying,
            RideStatus::Arrived,
            RideStatus::Completed,
        ];
        for status in steps {
            service.update_status(&ride.id, status).await.unwrap();
        }
        for status in steps {
            assert_eq!(recv(&mut rx).await.data.status, status);
        }

        assert_eq!(service.current_status(&ride.id).unwrap(), RideStatus::Completed);
        assert!(service
            .update_status(&ride.id, RideStatus::Enroute)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_repeated_update_is_rejected_and_not_published() {
        let (repo, bus, service) = setup();
        let ride = service.create_ride(new_ride()).await.unwrap();
        repo.assign(&ride.id, "chair-1");
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<RideStatusEvent>>();
        bus.subscribe(ride_topic(&ride.id), Arc::new(tx));

        service.update_status(&ride.id, RideStatus::Enroute).await.unwrap();
        let err = service.update_status(&ride.id, RideStatus::Enroute).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: RideStatus::Enroute,
                to: RideStatus::Enroute,
                ..
            }
        ));

        assert_eq!(
            repo.status_log(&ride.id),
            vec![RideStatus::Matching, RideStatus::Enroute]
        );
        assert_eq!(recv(&mut rx).await.data.status, RideStatus::Enroute);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_unknown_ride_is_not_found() {
        let (_repo, _bus, service) = setup();
        let err = service.update_status("missing", RideStatus::Enroute).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

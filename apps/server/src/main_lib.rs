use std::sync::Arc;

use crate::config::Config;
use isuride_core::{
    chairs::{
        ChairLocationService, ChairLocationServiceTrait, ChairModelCatalog, ChairRepositoryTrait,
        ChairService, ChairServiceTrait,
    },
    distance::{DistanceAggregationWriter, DistanceRepositoryTrait},
    matching::{MatchingService, MatchingServiceTrait},
    notifications::NotificationBus,
    rides::{RideService, RideServiceTrait},
};
use isuride_storage_sqlite::{
    chairs::ChairRepository,
    db::{self, write_actor},
    distance::DistanceRepository,
    matching::MatchingRepository,
    rides::RideRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub chair_service: Arc<dyn ChairServiceTrait + Send + Sync>,
    pub location_service: Arc<dyn ChairLocationServiceTrait + Send + Sync>,
    pub ride_service: Arc<dyn RideServiceTrait + Send + Sync>,
    pub matching_service: Arc<dyn MatchingServiceTrait + Send + Sync>,
    pub bus: Arc<NotificationBus>,
    pub distance_writer: Arc<DistanceAggregationWriter>,
}

pub fn init_tracing() {
    let log_format = std::env::var("ISURIDE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let chair_repository = Arc::new(ChairRepository::new(pool.clone(), writer.clone()));
    let ride_repository = Arc::new(RideRepository::new(pool.clone(), writer.clone()));
    let matching_repository = Arc::new(MatchingRepository::new(pool.clone(), writer.clone()));
    let distance_repository = Arc::new(DistanceRepository::new(pool.clone(), writer.clone()));

    let catalog = Arc::new(ChairModelCatalog::new(chair_repository.list_chair_models()?));
    if catalog.is_empty() {
        anyhow::bail!("chair model catalog is empty; migrations did not seed chair_models");
    }
    tracing::info!("Loaded {} chair models", catalog.len());

    let rebuilt = distance_repository.rebuild_chair_total_distances().await?;
    tracing::info!("Rebuilt total distances for {} chairs", rebuilt);

    let distance_writer = Arc::new(DistanceAggregationWriter::spawn(
        distance_repository.clone(),
        config.distance_writer_config(),
    ));
    let bus = Arc::new(NotificationBus::new());

    let chair_service: Arc<dyn ChairServiceTrait + Send + Sync> = Arc::new(ChairService::new(
        chair_repository.clone(),
        distance_repository,
        catalog.clone(),
    ));
    let location_service: Arc<dyn ChairLocationServiceTrait + Send + Sync> =
        Arc::new(ChairLocationService::new(chair_repository, distance_writer.clone()));
    let ride_service: Arc<dyn RideServiceTrait + Send + Sync> =
        Arc::new(RideService::new(ride_repository, bus.clone()));
    let matching_service: Arc<dyn MatchingServiceTrait + Send + Sync> =
        Arc::new(MatchingService::new(matching_repository, catalog));

    Ok(Arc::new(AppState {
        chair_service,
        location_service,
        ride_service,
        matching_service,
        bus,
        distance_writer,
    }))
}

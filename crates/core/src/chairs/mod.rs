//! Chairs module - chair registry, location ingest and nearby search.

mod chairs_model;
mod chairs_service;
mod chairs_traits;
mod location_service;


pub use chairs_model::{
    Chair, ChairLocation, ChairModel, ChairModelCatalog, NearbyChair, NewChair, RecordedLocation,
};
pub use chairs_service::ChairService;
pub use chairs_traits::{ChairLocationServiceTrait, ChairRepositoryTrait, ChairServiceTrait};
pub use location_service::ChairLocationService;

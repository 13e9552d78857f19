//! SQLite storage implementation for chair total distances.

mod model;
mod repository;

pub use model::ChairTotalDistanceDB;
pub use repository::DistanceRepository;

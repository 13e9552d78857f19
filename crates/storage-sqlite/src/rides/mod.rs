//! SQLite storage implementation for rides and their status log.

mod model;
mod repository;

pub use model::{RideDB, RideStatusDB};
pub use repository::RideRepository;

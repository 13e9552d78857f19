//! SQLite storage implementation for chairs and their location log.

mod model;
mod repository;

pub use model::{ChairDB, ChairLocationDB, ChairModelDB};
pub use repository::ChairRepository;

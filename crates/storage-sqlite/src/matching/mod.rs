//! SQLite storage implementation for the dispatch matcher.

mod repository;

pub use repository::MatchingRepository;

//! Matching module - the dispatch matcher pairing waiting rides with chairs.

mod matching_model;
mod matching_service;
mod matching_traits;


pub use matching_model::{ChairCandidate, MatchResult, ScoredChair};
pub use matching_service::{select_fastest_chair, MatchingService};
pub use matching_traits::{MatchingRepositoryTrait, MatchingServiceTrait};

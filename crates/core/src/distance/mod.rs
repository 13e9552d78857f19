//! Distance module - total-distance models, storage trait and the background
//! aggregation writer.

mod distance_model;
mod distance_traits;
mod distance_writer;


pub use distance_model::{ChairTotalDistance, ChairTotalDistanceDelta};
pub use distance_traits::DistanceRepositoryTrait;
pub use distance_writer::{coalesce_deltas, DistanceAggregationWriter, DistanceWriterConfig, EnqueueError};

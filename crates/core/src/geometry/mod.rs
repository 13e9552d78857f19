//! Grid geometry and the pickup cost model used by dispatch.

mod cost_model;
mod geometry_model;

pub use cost_model::{manhattan_distance, ride_cost, travel_time};
pub use geometry_model::Coordinate;

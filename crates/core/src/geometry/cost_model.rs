//! Distance and travel-time functions.
//!
//! Distance is the L1 norm over grid coordinates; real road networks are out
//! of scope. Every function here is pure and deterministic.

use super::Coordinate;

/// Manhattan distance between two grid points.
///
/// Computed in `i64` so extreme coordinates cannot overflow.
pub fn manhattan_distance(a: Coordinate, b: Coordinate) -> i64 {
    let d_lat = (i64::from(a.latitude) - i64::from(b.latitude)).abs();
    let d_lon = (i64::from(a.longitude) - i64::from(b.longitude)).abs();
    d_lat + d_lon
}

/// Time units needed to travel from `from` to `to` at `speed`.
///
/// `speed` must be strictly positive; the chair model catalog rejects other
/// values before they reach this function.
pub fn travel_time(from: Coordinate, to: Coordinate, speed: i32) -> f64 {
    manhattan_distance(from, to) as f64 / f64::from(speed)
}

/// Total time for a chair at `chair_at` to reach `pickup` and then carry the
/// rider to `destination`.
pub fn ride_cost(chair_at: Coordinate, speed: i32, pickup: Coordinate, destination: Coordinate) -> f64 {
    travel_time(chair_at, pickup, speed) + travel_time(pickup, destination, speed)
}

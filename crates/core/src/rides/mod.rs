//! Rides module - ride requests and their status lifecycle.

mod rides_model;
mod rides_service;
mod rides_traits;

#[cfg(test)]
mod rides_service_tests;

pub use rides_model::{check_transition, NewRide, Ride, RideStatus, RideStatusRecord, StatusTransition};
pub use rides_service::RideService;
pub use rides_traits::{RideRepositoryTrait, RideServiceTrait};

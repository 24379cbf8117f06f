//! Construction of facilities and services from configuration.

pub mod facility_builder;

pub use facility_builder::{build_agent, build_facility, build_service, build_service_with_agent};

//! Configuration models for the facility layout, billing and the assistant.

pub mod facility;

pub use facility::{AgentBackendConfig, AgentConfig, FacilityConfig};

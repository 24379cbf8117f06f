//! Error types for facility operations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{LicensePlate, SpotId, SpotType};

/// Coarse classification of a [`ParkingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Facility is full for the requested type.
    Capacity,
    /// Request conflicts with current spot/session state.
    StateConflict,
    /// Timestamps are out of order.
    Temporal,
    /// Malformed caller input.
    Validation,
    /// Durable store failed; nothing was committed.
    Persistence,
}

/// Errors produced by the allocation and session core.
#[derive(Debug, Error)]
pub enum ParkingError {
    /// No free spot of the requested type.
    #[error("no free {spot_type} spot")]
    NoSpotAvailable {
        /// Requested type.
        spot_type: SpotType,
    },
    /// Spot key does not exist in the facility.
    #[error("unknown spot {0}")]
    UnknownSpot(SpotId),
    /// Release requested for a free spot.
    #[error("spot {0} is not occupied")]
    SpotNotOccupied(SpotId),
    /// Vehicle already has an open session.
    #[error("vehicle {0} is already parked")]
    VehicleAlreadyParked(LicensePlate),
    /// Spot is already bound to an open session.
    #[error("spot {0} is already occupied")]
    SpotAlreadyOccupied(SpotId),
    /// Vehicle has no open session.
    #[error("vehicle {0} is not parked")]
    VehicleNotParked(LicensePlate),
    /// Exit precedes entry.
    #[error("exit time {exit} precedes entry time {entry}")]
    InvalidExitTime {
        /// Session entry.
        entry: DateTime<Utc>,
        /// Rejected exit.
        exit: DateTime<Utc>,
    },
    /// Fee requested for a negative duration.
    #[error("negative parking duration: exit {exit} is before entry {entry}")]
    NegativeDuration {
        /// Session entry.
        entry: DateTime<Utc>,
        /// Rejected exit.
        exit: DateTime<Utc>,
    },
    /// Plate failed normalisation.
    #[error("invalid license plate: {0}")]
    InvalidPlate(String),
    /// Gateway failure; the change was rolled back.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ParkingError {
    /// Taxonomy bucket for this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSpotAvailable { .. } => ErrorKind::Capacity,
            Self::UnknownSpot(_)
            | Self::SpotNotOccupied(_)
            | Self::VehicleAlreadyParked(_)
            | Self::SpotAlreadyOccupied(_)
            | Self::VehicleNotParked(_) => ErrorKind::StateConflict,
            Self::InvalidExitTime { .. } | Self::NegativeDuration { .. } => ErrorKind::Temporal,
            Self::InvalidPlate(_) => ErrorKind::Validation,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Errors raised by persistence gateways.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Underlying storage I/O failed.
    #[error("storage i/o failed: {0}")]
    Io(String),
    /// A record could not be encoded or decoded.
    #[error("record encoding failed: {0}")]
    Encoding(String),
    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Failures of the agent path. All of them trigger the fallback.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Agent path switched off by configuration.
    #[error("agent disabled")]
    Disabled,
    /// Agent did not answer in time.
    #[error("agent timed out after {0:?}")]
    Timeout(Duration),
    /// Provider or transport failure.
    #[error("agent provider error: {0}")]
    Provider(String),
    /// Output could not be used.
    #[error("malformed agent output: {0}")]
    Malformed(String),
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value violates a constraint.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Input could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// Environment variable holds an unusable value.
    #[error("environment variable {key}: {message}")]
    Env {
        /// Variable name.
        key: String,
        /// What was wrong with it.
        message: String,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

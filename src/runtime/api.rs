//! Request and response models for the caller-facing operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{ErrorKind, OccupancyReport, ParkingError, ParkingSession, SessionId, SpotType};

/// Vehicle arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    /// License plate as typed.
    pub plate: String,
    /// Body color.
    pub color: String,
    /// Manufacturer.
    pub brand: String,
    /// Requested spot type.
    #[serde(default)]
    pub spot_type: SpotType,
}

/// Confirmation of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReceipt {
    /// New session.
    pub session_id: SessionId,
    /// Normalised plate.
    pub plate: String,
    /// Spot label, e.g. `1-03`.
    pub spot: String,
    /// Type of the assigned spot.
    pub spot_type: SpotType,
    /// Entry instant.
    pub entry_time: DateTime<Utc>,
}

impl From<&ParkingSession> for EntryReceipt {
    fn from(session: &ParkingSession) -> Self {
        Self {
            session_id: session.id,
            plate: session.vehicle.plate.to_string(),
            spot: session.spot.to_string(),
            spot_type: session.spot_type,
            entry_time: session.entry_time,
        }
    }
}

/// Confirmation of an exit with the amount due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReceipt {
    /// Closed session.
    pub session_id: SessionId,
    /// Normalised plate.
    pub plate: String,
    /// Released spot label.
    pub spot: String,
    /// Entry instant.
    pub entry_time: DateTime<Utc>,
    /// Exit instant.
    pub exit_time: DateTime<Utc>,
    /// Whole minutes parked.
    pub duration_minutes: i64,
    /// Rate the stay was billed at.
    pub hourly_rate: Decimal,
    /// Amount due.
    pub fee: Decimal,
}

impl From<&ParkingSession> for ExitReceipt {
    /// Receipt for a closed session. An open session reads as a zero-length
    /// stay with no fee.
    fn from(session: &ParkingSession) -> Self {
        let exit_time = session.exit_time.unwrap_or(session.entry_time);
        Self {
            session_id: session.id,
            plate: session.vehicle.plate.to_string(),
            spot: session.spot.to_string(),
            entry_time: session.entry_time,
            exit_time,
            duration_minutes: (exit_time - session.entry_time).num_minutes(),
            hourly_rate: session.hourly_rate,
            fee: session.fee.unwrap_or_default(),
        }
    }
}

/// Occupancy at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// When the figures were taken.
    pub taken_at: DateTime<Utc>,
    /// Spot counts.
    pub occupancy: OccupancyReport,
    /// Open sessions.
    pub active_sessions: usize,
}

/// Natural-language question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    /// Question text.
    pub question: String,
}

/// Error payload for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable message naming the violated rule.
    pub message: String,
}

impl From<&ParkingError> for ErrorResponse {
    fn from(err: &ParkingError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Spots managed.
    pub spots: usize,
    /// Open sessions.
    pub open_sessions: usize,
    /// Whether questions try the agent first.
    pub agent_enabled: bool,
}

//! Session events appended to the persistence gateway.
//!
//! Every committed transition of a session produces exactly one event; the
//! event log is the durable history the facility is rebuilt from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{ParkingSession, SessionId};

/// Transition recorded by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "session", rename_all = "snake_case")]
pub enum SessionEventKind {
    /// Session opened at entry.
    Opened(ParkingSession),
    /// Session closed at exit, carrying exit time and fee.
    Closed(ParkingSession),
}

/// Event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Event identifier.
    pub event_id: Uuid,
    /// When the transition happened.
    pub recorded_at: DateTime<Utc>,
    /// Transition and the session state after it.
    pub kind: SessionEventKind,
}

impl SessionEvent {
    /// Event for a newly opened session.
    pub fn opened(session: ParkingSession, recorded_at: DateTime<Utc>) -> Self {
        build_session_event(SessionEventKind::Opened(session), recorded_at)
    }

    /// Event for a session that was just closed.
    pub fn closed(session: ParkingSession, recorded_at: DateTime<Utc>) -> Self {
        build_session_event(SessionEventKind::Closed(session), recorded_at)
    }

    /// Session state carried by the event.
    pub const fn session(&self) -> &ParkingSession {
        match &self.kind {
            SessionEventKind::Opened(session) | SessionEventKind::Closed(session) => session,
        }
    }

    /// Identifier of the affected session.
    pub const fn session_id(&self) -> SessionId {
        self.session().id
    }

    /// Short action name (open, close).
    pub const fn action(&self) -> &'static str {
        match self.kind {
            SessionEventKind::Opened(_) => "open",
            SessionEventKind::Closed(_) => "close",
        }
    }
}

/// Helper to build a session event with a fresh identifier.
pub fn build_session_event(kind: SessionEventKind, recorded_at: DateTime<Utc>) -> SessionEvent {
    SessionEvent {
        event_id: Uuid::new_v4(),
        recorded_at,
        kind,
    }
}

//! Persistence gateway backends.
//!
//! Both backends store an append-only log of [`SessionEvent`]s and derive the
//! session table by replaying it, so an `Opened` followed by a `Closed` for
//! the same id yields one closed session.

use std::collections::BTreeMap;

use crate::core::{ParkingSession, SessionEvent, SessionId, TimeWindow};

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlGateway;
pub use memory::InMemoryGateway;

/// Session table rebuilt from an event log.
#[derive(Debug, Default, Clone)]
pub struct SessionReplay {
    sessions: BTreeMap<SessionId, ParkingSession>,
}

impl SessionReplay {
    /// Replay `events` in order.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a SessionEvent>) -> Self {
        let mut replay = Self::default();
        for event in events {
            replay.apply(event);
        }
        replay
    }

    /// Fold one event into the table; later events win.
    pub fn apply(&mut self, event: &SessionEvent) {
        let session = event.session();
        self.sessions.insert(session.id, session.clone());
    }

    /// Sessions without an exit, ordered by id.
    pub fn open_sessions(&self) -> Vec<ParkingSession> {
        self.sessions
            .values()
            .filter(|s| s.is_open())
            .cloned()
            .collect()
    }

    /// Closed sessions, optionally only those that exited in `window`.
    pub fn closed_sessions(&self, window: Option<TimeWindow>) -> Vec<ParkingSession> {
        self.sessions
            .values()
            .filter(|s| match (s.exit_time, window) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(exit), Some(window)) => window.contains(exit),
            })
            .cloned()
            .collect()
    }

    /// Number of distinct sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session was recorded.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! In-memory gateway for development and tests.

use parking_lot::Mutex;

use crate::core::{
    ParkingSession, ParkingSpot, PersistenceError, PersistenceGateway, SessionEvent, TimeWindow,
};

use super::SessionReplay;

#[derive(Default)]
struct MemoryStore {
    spots: Vec<ParkingSpot>,
    events: Vec<SessionEvent>,
    replay: SessionReplay,
    failing_appends: usize,
}

/// Gateway keeping spots and the event log in process memory.
#[derive(Default)]
pub struct InMemoryGateway {
    store: Mutex<MemoryStore>,
}

impl InMemoryGateway {
    /// Empty gateway; the facility is initialised on first build.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-seeded with `spots`.
    pub fn with_spots(spots: Vec<ParkingSpot>) -> Self {
        let gateway = Self::default();
        gateway.store.lock().spots = spots;
        gateway
    }

    /// Make the next `count` appends fail with [`PersistenceError::Rejected`].
    pub fn fail_next_appends(&self, count: usize) {
        self.store.lock().failing_appends = count;
    }

    /// Copy of the accepted events, oldest first.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.store.lock().events.clone()
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn load_spots(&self) -> Result<Vec<ParkingSpot>, PersistenceError> {
        Ok(self.store.lock().spots.clone())
    }

    fn save_spots(&self, spots: &[ParkingSpot]) -> Result<(), PersistenceError> {
        self.store.lock().spots = spots.to_vec();
        Ok(())
    }

    fn load_open_sessions(&self) -> Result<Vec<ParkingSession>, PersistenceError> {
        Ok(self.store.lock().replay.open_sessions())
    }

    fn load_closed_sessions(
        &self,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ParkingSession>, PersistenceError> {
        Ok(self.store.lock().replay.closed_sessions(window))
    }

    fn append_session_event(&self, event: &SessionEvent) -> Result<(), PersistenceError> {
        let mut store = self.store.lock();
        if store.failing_appends > 0 {
            store.failing_appends -= 1;
            return Err(PersistenceError::Rejected(format!(
                "injected failure for {} of session {}",
                event.action(),
                event.session_id()
            )));
        }
        store.replay.apply(event);
        store.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LicensePlate, SessionId, SpotId, SpotType, Vehicle};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn opened(id: u64) -> ParkingSession {
        ParkingSession {
            id: SessionId(id),
            vehicle: Vehicle::new(LicensePlate::parse("AB-123").unwrap(), "red", "Fiat"),
            spot: SpotId::new(1, 1),
            spot_type: SpotType::Regular,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            exit_time: None,
            fee: None,
            hourly_rate: Decimal::new(5, 0),
        }
    }

    #[test]
    fn test_replay_closes_open_session() {
        let gateway = InMemoryGateway::new();
        let session = opened(1);
        let t = session.entry_time;
        gateway
            .append_session_event(&SessionEvent::opened(session.clone(), t))
            .unwrap();
        assert_eq!(gateway.load_open_sessions().unwrap().len(), 1);

        let mut closed = session;
        closed.exit_time = Some(t + chrono::Duration::hours(1));
        closed.fee = Some(Decimal::new(5, 0));
        gateway
            .append_session_event(&SessionEvent::closed(closed, t))
            .unwrap();
        assert!(gateway.load_open_sessions().unwrap().is_empty());
        assert_eq!(gateway.load_closed_sessions(None).unwrap().len(), 1);
        assert_eq!(gateway.events().len(), 2);
    }

    #[test]
    fn test_injected_failures_are_not_recorded() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next_appends(1);
        let session = opened(1);
        let t = session.entry_time;
        let err = gateway
            .append_session_event(&SessionEvent::opened(session.clone(), t))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected(_)));
        assert!(gateway.events().is_empty());
        gateway
            .append_session_event(&SessionEvent::opened(session, t))
            .unwrap();
        assert_eq!(gateway.events().len(), 1);
    }
}

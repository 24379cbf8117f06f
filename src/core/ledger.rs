//! Session ledger: the `Open -> Closed` state machine.
//!
//! The ledger keeps every session ever opened (closed sessions are the
//! durable history behind analytics) plus two indexes over the open ones:
//! vehicle to session and spot to session. Both indexes hold exactly the
//! open sessions at all times.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::{LicensePlate, ParkingError, ParkingSession, SessionId, SpotId, SpotType, Vehicle};

/// Open-session indexes plus full session history.
#[derive(Debug, Clone)]
pub struct SessionLedger {
    sessions: BTreeMap<SessionId, ParkingSession>,
    open_by_vehicle: HashMap<LicensePlate, SessionId>,
    open_by_spot: HashMap<SpotId, SessionId>,
    vehicles: HashMap<LicensePlate, Vehicle>,
    next_id: u64,
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLedger {
    /// Empty ledger; the first session gets id 1.
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            open_by_vehicle: HashMap::new(),
            open_by_spot: HashMap::new(),
            vehicles: HashMap::new(),
            next_id: 1,
        }
    }

    /// Rebuild a ledger from stored sessions (open and closed).
    ///
    /// Fails if the stored sessions break the one-open-session-per-vehicle or
    /// one-open-session-per-spot rules.
    pub fn restore(sessions: impl IntoIterator<Item = ParkingSession>) -> Result<Self, ParkingError> {
        let mut ledger = Self::new();
        for session in sessions {
            if session.is_open() {
                ledger.check_can_open(&session.vehicle.plate, session.spot)?;
                ledger
                    .open_by_vehicle
                    .insert(session.vehicle.plate.clone(), session.id);
                ledger.open_by_spot.insert(session.spot, session.id);
            }
            ledger
                .vehicles
                .entry(session.vehicle.plate.clone())
                .or_insert_with(|| session.vehicle.clone());
            ledger.next_id = ledger.next_id.max(session.id.0 + 1);
            ledger.sessions.insert(session.id, session);
        }
        Ok(ledger)
    }

    /// Open a session for `vehicle` on `spot` at `entry_time`.
    pub fn open_session(
        &mut self,
        vehicle: Vehicle,
        spot: SpotId,
        spot_type: SpotType,
        entry_time: DateTime<Utc>,
        hourly_rate: Decimal,
    ) -> Result<SessionId, ParkingError> {
        self.open(vehicle, spot, spot_type, entry_time, hourly_rate)
            .map(|session| session.id)
    }

    pub(crate) fn open(
        &mut self,
        vehicle: Vehicle,
        spot: SpotId,
        spot_type: SpotType,
        entry_time: DateTime<Utc>,
        hourly_rate: Decimal,
    ) -> Result<&ParkingSession, ParkingError> {
        self.check_can_open(&vehicle.plate, spot)?;
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.open_by_vehicle.insert(vehicle.plate.clone(), id);
        self.open_by_spot.insert(spot, id);
        self.vehicles
            .entry(vehicle.plate.clone())
            .or_insert_with(|| vehicle.clone());
        let session = self.sessions.entry(id).or_insert(ParkingSession {
            id,
            vehicle,
            spot,
            spot_type,
            entry_time,
            exit_time: None,
            fee: None,
            hourly_rate,
        });
        Ok(session)
    }

    /// Check that `exit_time` may close the open session of `plate`.
    pub fn validate_exit(
        &self,
        plate: &LicensePlate,
        exit_time: DateTime<Utc>,
    ) -> Result<&ParkingSession, ParkingError> {
        let session = self
            .find_open_session(plate)
            .ok_or_else(|| ParkingError::VehicleNotParked(plate.clone()))?;
        if exit_time < session.entry_time {
            return Err(ParkingError::InvalidExitTime {
                entry: session.entry_time,
                exit: exit_time,
            });
        }
        Ok(session)
    }

    /// Close the open session of `plate`. Exit time and fee are final.
    pub fn close_session(
        &mut self,
        plate: &LicensePlate,
        exit_time: DateTime<Utc>,
        fee: Decimal,
    ) -> Result<SessionId, ParkingError> {
        self.close(plate, exit_time, fee).map(|session| session.id)
    }

    pub(crate) fn close(
        &mut self,
        plate: &LicensePlate,
        exit_time: DateTime<Utc>,
        fee: Decimal,
    ) -> Result<&ParkingSession, ParkingError> {
        let id = self.validate_exit(plate, exit_time)?.id;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| ParkingError::VehicleNotParked(plate.clone()))?;
        session.exit_time = Some(exit_time);
        session.fee = Some(fee);
        self.open_by_vehicle.remove(plate);
        self.open_by_spot.remove(&session.spot);
        Ok(session)
    }

    /// Open session of `plate`, if any.
    pub fn find_open_session(&self, plate: &LicensePlate) -> Option<&ParkingSession> {
        self.open_by_vehicle
            .get(plate)
            .and_then(|id| self.sessions.get(id))
    }

    /// Open session bound to `spot`, if any.
    pub fn open_session_on(&self, spot: SpotId) -> Option<&ParkingSession> {
        self.open_by_spot.get(&spot).and_then(|id| self.sessions.get(id))
    }

    /// Undo an `open` whose persistence failed.
    pub(crate) fn discard_open(&mut self, id: SessionId) -> Option<ParkingSession> {
        let session = self.sessions.get(&id).filter(|s| s.is_open())?;
        let plate = session.vehicle.plate.clone();
        let spot = session.spot;
        self.open_by_vehicle.remove(&plate);
        self.open_by_spot.remove(&spot);
        if id.0 + 1 == self.next_id {
            self.next_id = id.0;
        }
        if !self.sessions.values().any(|s| s.id != id && s.vehicle.plate == plate) {
            self.vehicles.remove(&plate);
        }
        self.sessions.remove(&id)
    }

    /// Undo a `close` whose persistence failed.
    pub(crate) fn reopen(&mut self, id: SessionId) -> bool {
        let Some(session) = self.sessions.get_mut(&id) else {
            return false;
        };
        session.exit_time = None;
        session.fee = None;
        self.open_by_vehicle
            .insert(session.vehicle.plate.clone(), id);
        self.open_by_spot.insert(session.spot, id);
        true
    }

    /// Session by id.
    pub fn session(&self, id: SessionId) -> Option<&ParkingSession> {
        self.sessions.get(&id)
    }

    /// Every session, ordered by id.
    pub fn sessions(&self) -> impl Iterator<Item = &ParkingSession> {
        self.sessions.values()
    }

    /// Open sessions, ordered by id.
    pub fn open_sessions(&self) -> impl Iterator<Item = &ParkingSession> {
        self.sessions.values().filter(|s| s.is_open())
    }

    /// Number of open sessions.
    pub fn open_count(&self) -> usize {
        self.open_by_vehicle.len()
    }

    /// First recorded attributes of a vehicle.
    pub fn vehicle(&self, plate: &LicensePlate) -> Option<&Vehicle> {
        self.vehicles.get(plate)
    }

    fn check_can_open(&self, plate: &LicensePlate, spot: SpotId) -> Result<(), ParkingError> {
        if self.open_by_vehicle.contains_key(plate) {
            return Err(ParkingError::VehicleAlreadyParked(plate.clone()));
        }
        if self.open_by_spot.contains_key(&spot) {
            return Err(ParkingError::SpotAlreadyOccupied(spot));
        }
        Ok(())
    }
}

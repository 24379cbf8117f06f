//! Facility aggregate: spot allocator and session ledger behind one lock.
//!
//! Entry ("reserve a spot and open a session") and exit ("close a session and
//! release its spot") each run as one critical section under the write side
//! of a `parking_lot::RwLock`. The persistence gateway is called inside that
//! section; if it fails the in-memory change is rolled back before the lock
//! is released, so readers never see a half-applied transition.
//!
//! Reads go through [`Facility::snapshot`], which copies spots and sessions
//! under the read lock and hands back an owned [`FacilitySnapshot`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{
    FeeCalculator, LicensePlate, ParkingError, ParkingSession, ParkingSpot, PersistenceError,
    SessionEvent, SessionLedger, SpotAllocator, SpotId, SpotType, TimeWindow, Vehicle,
};
use crate::util::Clock;

/// Durable store consulted by the facility.
///
/// Implementations own durability only; allocation rules live in the core.
/// Calls are synchronous and happen inside the facility's critical section.
pub trait PersistenceGateway: Send + Sync {
    /// All spots of the facility.
    fn load_spots(&self) -> Result<Vec<ParkingSpot>, PersistenceError>;
    /// Store the spot layout (facility initialisation).
    fn save_spots(&self, spots: &[ParkingSpot]) -> Result<(), PersistenceError>;
    /// Sessions without an exit.
    fn load_open_sessions(&self) -> Result<Vec<ParkingSession>, PersistenceError>;
    /// Closed sessions, optionally limited to those that exited in `window`.
    fn load_closed_sessions(
        &self,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ParkingSession>, PersistenceError>;
    /// Durably record a session transition.
    fn append_session_event(&self, event: &SessionEvent) -> Result<(), PersistenceError>;
}

/// Source of consistent read-only views of the facility.
pub trait SnapshotSource: Send + Sync {
    /// Copy of the current state.
    fn snapshot(&self) -> FacilitySnapshot;
}

/// Point-in-time copy of spots and sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySnapshot {
    /// Clock reading when the copy was taken.
    pub taken_at: DateTime<Utc>,
    /// Spots in allocation order.
    pub spots: Vec<ParkingSpot>,
    /// Sessions ordered by id, open and closed.
    pub sessions: Vec<ParkingSession>,
}

struct FacilityState {
    allocator: SpotAllocator,
    ledger: SessionLedger,
}

/// The parking facility: spots, sessions, fees and the store behind them.
pub struct Facility {
    state: RwLock<FacilityState>,
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
    fees: FeeCalculator,
    hourly_rate: Decimal,
}

impl Facility {
    /// Assemble a facility from already loaded spots and sessions.
    ///
    /// Spot occupancy is recomputed from the open sessions.
    pub fn new(
        spots: Vec<ParkingSpot>,
        sessions: Vec<ParkingSession>,
        gateway: Arc<dyn PersistenceGateway>,
        clock: Arc<dyn Clock>,
        fees: FeeCalculator,
        hourly_rate: Decimal,
    ) -> Result<Self, ParkingError> {
        let mut allocator = SpotAllocator::new(spots);
        let ledger = SessionLedger::restore(sessions)?;
        for session in ledger.open_sessions() {
            allocator.occupy(session.spot)?;
        }
        tracing::info!(
            spots = allocator.total(),
            open_sessions = ledger.open_count(),
            "facility state restored"
        );
        Ok(Self {
            state: RwLock::new(FacilityState { allocator, ledger }),
            gateway,
            clock,
            fees,
            hourly_rate,
        })
    }

    /// Load spots and sessions from `gateway`.
    pub fn load(
        gateway: Arc<dyn PersistenceGateway>,
        clock: Arc<dyn Clock>,
        fees: FeeCalculator,
        hourly_rate: Decimal,
    ) -> Result<Self, ParkingError> {
        let spots = gateway.load_spots()?;
        let mut sessions = gateway.load_closed_sessions(None)?;
        sessions.extend(gateway.load_open_sessions()?);
        sessions.sort_by_key(|s| s.id);
        Self::new(spots, sessions, gateway, clock, fees, hourly_rate)
    }

    /// Register a vehicle arriving for a spot of `spot_type`.
    pub fn register_entry(
        &self,
        plate: &str,
        color: &str,
        brand: &str,
        spot_type: SpotType,
    ) -> Result<ParkingSession, ParkingError> {
        let vehicle = Vehicle::new(LicensePlate::parse(plate)?, color, brand);
        let mut guard = self.state.write();
        let state = &mut *guard;
        let now = self.clock.now();

        if state.ledger.find_open_session(&vehicle.plate).is_some() {
            tracing::warn!(plate = %vehicle.plate, "entry rejected: vehicle already parked");
            return Err(ParkingError::VehicleAlreadyParked(vehicle.plate));
        }
        let spot = state.allocator.reserve(spot_type).inspect_err(|_| {
            tracing::warn!(plate = %vehicle.plate, %spot_type, "entry rejected: no free spot");
        })?;

        let plate = vehicle.plate.clone();
        let session = match state.ledger.open(vehicle, spot, spot_type, now, self.hourly_rate) {
            Ok(session) => session.clone(),
            Err(err) => {
                undo_release(&mut state.allocator, spot);
                return Err(err);
            }
        };

        if let Err(err) = self
            .gateway
            .append_session_event(&SessionEvent::opened(session.clone(), now))
        {
            tracing::warn!(%plate, spot = %spot, error = %err, "entry not persisted, rolling back");
            state.ledger.discard_open(session.id);
            undo_release(&mut state.allocator, spot);
            return Err(err.into());
        }

        tracing::info!(%plate, spot = %spot, session = %session.id, "vehicle entered");
        Ok(session)
    }

    /// Register a vehicle leaving; returns the closed session with its fee.
    pub fn register_exit(&self, plate: &str) -> Result<ParkingSession, ParkingError> {
        let plate = LicensePlate::parse(plate)?;
        let mut guard = self.state.write();
        let state = &mut *guard;
        let now = self.clock.now();

        let open = state.ledger.validate_exit(&plate, now).inspect_err(|err| {
            tracing::warn!(%plate, error = %err, "exit rejected");
        })?;
        let spot = open.spot;
        let fee = self.fees.fee(open.entry_time, now, open.hourly_rate)?;

        let session = state.ledger.close(&plate, now, fee)?.clone();
        if let Err(err) = state.allocator.release(spot) {
            state.ledger.reopen(session.id);
            return Err(err);
        }

        if let Err(err) = self
            .gateway
            .append_session_event(&SessionEvent::closed(session.clone(), now))
        {
            tracing::warn!(%plate, spot = %spot, error = %err, "exit not persisted, rolling back");
            state.ledger.reopen(session.id);
            if let Err(occupy_err) = state.allocator.occupy(spot) {
                tracing::error!(spot = %spot, error = %occupy_err, "rollback could not re-occupy spot");
            }
            return Err(err.into());
        }

        tracing::info!(%plate, spot = %spot, session = %session.id, %fee, "vehicle exited");
        Ok(session)
    }

    /// Open session of `plate`, if any.
    pub fn find_open_session(&self, plate: &str) -> Option<ParkingSession> {
        let plate = LicensePlate::parse(plate).ok()?;
        self.state.read().ledger.find_open_session(&plate).cloned()
    }

    /// All open sessions.
    pub fn active_sessions(&self) -> Vec<ParkingSession> {
        self.state.read().ledger.open_sessions().cloned().collect()
    }

    /// First recorded attributes of a vehicle.
    pub fn vehicle(&self, plate: &str) -> Option<Vehicle> {
        let plate = LicensePlate::parse(plate).ok()?;
        self.state.read().ledger.vehicle(&plate).cloned()
    }

    /// Number of spots.
    pub fn total_spots(&self) -> usize {
        self.state.read().allocator.total()
    }

    /// Number of open sessions.
    pub fn open_count(&self) -> usize {
        self.state.read().ledger.open_count()
    }

    /// Rate applied to new sessions.
    pub const fn hourly_rate(&self) -> Decimal {
        self.hourly_rate
    }

    /// Current instant from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Check that occupied spots and open sessions are in bijection.
    /// Returns a description of every violation found.
    pub fn invariant_violations(&self) -> Vec<String> {
        let state = self.state.read();
        let mut violations = Vec::new();
        for spot in state.allocator.spots() {
            match (spot.is_occupied(), state.ledger.open_session_on(spot.id)) {
                (true, None) => violations.push(format!("spot {} occupied without session", spot.id)),
                (false, Some(s)) => violations.push(format!("spot {} free under session {}", spot.id, s.id)),
                (true, Some(s)) if s.spot != spot.id => {
                    violations.push(format!("spot {} indexed to session {} on {}", spot.id, s.id, s.spot));
                }
                _ => {}
            }
        }
        if state.allocator.occupied_count() != state.ledger.open_count() {
            violations.push(format!(
                "{} occupied spots for {} open sessions",
                state.allocator.occupied_count(),
                state.ledger.open_count()
            ));
        }
        violations
    }
}

impl SnapshotSource for Facility {
    fn snapshot(&self) -> FacilitySnapshot {
        let state = self.state.read();
        let snapshot = FacilitySnapshot {
            taken_at: self.clock.now(),
            spots: state.allocator.spots().cloned().collect(),
            sessions: state.ledger.sessions().cloned().collect(),
        };
        drop(state);
        tracing::debug!(
            spots = snapshot.spots.len(),
            sessions = snapshot.sessions.len(),
            "snapshot taken"
        );
        snapshot
    }
}

fn undo_release(allocator: &mut SpotAllocator, spot: SpotId) {
    if let Err(err) = allocator.release(spot) {
        tracing::error!(spot = %spot, error = %err, "rollback could not release spot");
    }
}

//! Caller-facing facade over the facility and the query router.

use std::sync::Arc;

use crate::assistant::{Answer, QueryRouter};
use crate::core::{
    AnalyticsAggregator, DailySummary, Facility, ParkingError, ParkingSession, SnapshotSource,
    Vehicle,
};
use crate::runtime::api::{EntryReceipt, EntryRequest, ExitReceipt, Health, StatusResponse};

/// Operations exposed to the transport layer.
pub struct ParkingService {
    facility: Arc<Facility>,
    router: QueryRouter,
    agent_enabled: bool,
}

impl ParkingService {
    /// Service over `facility`, answering questions through `router`.
    pub const fn new(facility: Arc<Facility>, router: QueryRouter, agent_enabled: bool) -> Self {
        Self {
            facility,
            router,
            agent_enabled,
        }
    }

    /// Underlying facility.
    pub const fn facility(&self) -> &Arc<Facility> {
        &self.facility
    }

    /// Register an arriving vehicle.
    pub fn register_entry(&self, request: &EntryRequest) -> Result<EntryReceipt, ParkingError> {
        let session = self.facility.register_entry(
            &request.plate,
            &request.color,
            &request.brand,
            request.spot_type,
        )?;
        Ok(EntryReceipt::from(&session))
    }

    /// Register a departing vehicle and bill it.
    pub fn register_exit(&self, plate: &str) -> Result<ExitReceipt, ParkingError> {
        let session = self.facility.register_exit(plate)?;
        Ok(ExitReceipt::from(&session))
    }

    /// Current occupancy.
    pub fn get_status(&self) -> StatusResponse {
        let snapshot = self.facility.snapshot();
        let analytics = AnalyticsAggregator::new(&snapshot);
        StatusResponse {
            taken_at: snapshot.taken_at,
            occupancy: analytics.occupancy(),
            active_sessions: analytics.current_vehicle_count(),
        }
    }

    /// Answer a natural-language question.
    pub async fn answer_question(&self, question: &str) -> Answer {
        self.router.answer(question).await
    }

    /// Open sessions.
    pub fn active_sessions(&self) -> Vec<ParkingSession> {
        self.facility.active_sessions()
    }

    /// Recorded attributes of a vehicle.
    pub fn vehicle(&self, plate: &str) -> Option<Vehicle> {
        self.facility.vehicle(plate)
    }

    /// Today's headline figures.
    pub fn summary(&self) -> DailySummary {
        AnalyticsAggregator::new(&self.facility.snapshot()).summary()
    }

    /// Health payload.
    pub fn health(&self) -> Health {
        Health {
            ok: self.facility.invariant_violations().is_empty(),
            spots: self.facility.total_spots(),
            open_sessions: self.facility.open_count(),
            agent_enabled: self.agent_enabled,
        }
    }
}

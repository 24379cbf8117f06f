//! Spot allocation, session lifecycle, billing and analytics.

pub mod allocator;
pub mod analytics;
pub mod error;
pub mod event;
pub mod facility;
pub mod fee;
pub mod ledger;
pub mod types;

pub use allocator::SpotAllocator;
pub use analytics::{
    AnalyticsAggregator, DailyRevenue, DailySummary, DurationStats, FloorOccupancy,
    HourlyOccupancy, OccupancyReport, TypeOccupancy, VehicleAttribute, VehicleFilter,
};
pub use error::{AgentError, AppResult, ConfigError, ErrorKind, ParkingError, PersistenceError};
pub use event::{build_session_event, SessionEvent, SessionEventKind};
pub use facility::{Facility, FacilitySnapshot, PersistenceGateway, SnapshotSource};
pub use fee::{fee, round_currency, FeeCalculator, CURRENCY_DP};
pub use ledger::SessionLedger;
pub use types::{
    LicensePlate, Occupancy, ParkingSession, ParkingSpot, PaymentStatus, SessionId, SessionState,
    SpotId, SpotType, TimeWindow, Vehicle, MAX_PLATE_LEN,
};

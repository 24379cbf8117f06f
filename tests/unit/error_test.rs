//! Tests for error types

use chrono::{TimeZone, Utc};
use parking_facility::core::{
    AgentError, ConfigError, ErrorKind, LicensePlate, ParkingError, PersistenceError, SpotId,
    SpotType,
};

#[test]
fn test_no_spot_available_error() {
    let err = ParkingError::NoSpotAvailable {
        spot_type: SpotType::Vip,
    };
    assert_eq!(format!("{}", err), "no free vip spot");
    assert_eq!(err.kind(), ErrorKind::Capacity);
}

#[test]
fn test_state_conflict_errors() {
    let plate = LicensePlate::parse("ab-123").unwrap();
    let parked = ParkingError::VehicleAlreadyParked(plate.clone());
    assert_eq!(format!("{}", parked), "vehicle AB-123 is already parked");
    assert_eq!(parked.kind(), ErrorKind::StateConflict);
    assert_eq!(ParkingError::VehicleNotParked(plate).kind(), ErrorKind::StateConflict);
    assert_eq!(
        ParkingError::SpotAlreadyOccupied(SpotId::new(2, 7)).kind(),
        ErrorKind::StateConflict
    );
}

#[test]
fn test_temporal_error() {
    let entry = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let exit = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
    let err = ParkingError::InvalidExitTime { entry, exit };
    assert_eq!(err.kind(), ErrorKind::Temporal);
    assert!(err.to_string().contains("precedes"), "{err}");
}

#[test]
fn test_persistence_error_converts() {
    let err: ParkingError = PersistenceError::Io("disk full".to_string()).into();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(format!("{}", err), "persistence error: storage i/o failed: disk full");
}

#[test]
fn test_agent_and_config_errors() {
    let timeout = AgentError::Timeout(std::time::Duration::from_millis(250));
    assert!(timeout.to_string().contains("250ms"), "{timeout}");
    let env = ConfigError::Env {
        key: "PARKING_FLOORS".to_string(),
        message: "invalid digit".to_string(),
    };
    assert_eq!(format!("{}", env), "environment variable PARKING_FLOORS: invalid digit");
}

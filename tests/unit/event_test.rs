//! Tests for session events

use chrono::{TimeZone, Utc};
use parking_facility::core::{
    LicensePlate, ParkingSession, SessionEvent, SessionId, SpotId, SpotType, Vehicle,
};
use rust_decimal::Decimal;

fn session() -> ParkingSession {
    ParkingSession {
        id: SessionId(7),
        vehicle: Vehicle::new(LicensePlate::parse("xy-987").unwrap(), " Red ", "Seat"),
        spot: SpotId::new(2, 4),
        spot_type: SpotType::Regular,
        entry_time: Utc.with_ymd_and_hms(2024, 4, 2, 7, 45, 0).unwrap(),
        exit_time: None,
        fee: None,
        hourly_rate: Decimal::new(5, 0),
    }
}

#[test]
fn test_event_json_shape() {
    let event = SessionEvent::opened(session(), Utc.with_ymd_and_hms(2024, 4, 2, 7, 45, 0).unwrap());
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["kind"]["action"], "opened");
    assert_eq!(value["kind"]["session"]["vehicle"]["plate"], "XY-987");
    assert_eq!(value["kind"]["session"]["vehicle"]["color"], "Red");

    let decoded: SessionEvent = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, event);
    assert_eq!(decoded.action(), "open");
    assert_eq!(decoded.session_id(), SessionId(7));
}

#[test]
fn test_event_ids_are_unique() {
    let at = Utc.with_ymd_and_hms(2024, 4, 2, 7, 45, 0).unwrap();
    let a = SessionEvent::opened(session(), at);
    let b = SessionEvent::opened(session(), at);
    assert_ne!(a.event_id, b.event_id);
}

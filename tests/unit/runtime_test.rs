//! Tests for the caller-facing service and API models

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use parking_facility::builders::build_service;
use parking_facility::config::FacilityConfig;
use parking_facility::assistant::AnswerSource;
use parking_facility::core::{ErrorKind, SpotType};
use parking_facility::infra::InMemoryGateway;
use parking_facility::runtime::{EntryRequest, ErrorResponse, ExitReceipt, ParkingService};
use parking_facility::util::ManualClock;
use rust_decimal::Decimal;

fn service() -> (ParkingService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()));
    let cfg = FacilityConfig {
        floors: 1,
        spots_per_floor: 2,
        default_layout: false,
        ..FacilityConfig::default()
    };
    let svc = build_service(&cfg, Arc::new(InMemoryGateway::new()), clock.clone()).unwrap();
    (svc, clock)
}

fn entry(plate: &str) -> EntryRequest {
    EntryRequest {
        plate: plate.to_string(),
        color: "red".to_string(),
        brand: "Toyota".to_string(),
        spot_type: SpotType::Regular,
    }
}

#[test]
fn test_entry_request_defaults_to_regular() {
    let req: EntryRequest =
        serde_json::from_str(r#"{ "plate": "AB-1", "color": "red", "brand": "Fiat" }"#).unwrap();
    assert_eq!(req.spot_type, SpotType::Regular);
}

#[test]
fn test_entry_and_exit_receipts() {
    let (svc, clock) = service();
    let receipt = svc.register_entry(&entry("ab-123")).unwrap();
    assert_eq!(receipt.plate, "AB-123");
    assert_eq!(receipt.spot, "1-01");

    clock.advance(Duration::seconds(3601));
    let exit = svc.register_exit("AB-123").unwrap();
    assert_eq!(exit.session_id, receipt.session_id);
    assert_eq!(exit.duration_minutes, 60);
    assert_eq!(exit.fee, Decimal::new(10, 0));
    assert_eq!(svc.vehicle("AB-123").unwrap().color, "red");
}

#[test]
fn test_status_and_summary() {
    let (svc, clock) = service();
    svc.register_entry(&entry("AB-123")).unwrap();
    svc.register_entry(&entry("CD-456")).unwrap();
    clock.advance(Duration::minutes(30));
    svc.register_exit("CD-456").unwrap();

    let status = svc.get_status();
    assert_eq!(status.active_sessions, 1);
    assert_eq!(status.occupancy.available_spots, 1);
    assert_eq!(svc.active_sessions().len(), 1);

    let summary = svc.summary();
    assert_eq!(summary.today_vehicles, 2);
    assert_eq!(summary.today_revenue, Decimal::new(5, 0));
    assert!((summary.average_duration_hours - 0.5).abs() < 1e-9);
}

#[test]
fn test_error_response() {
    let (svc, _) = service();
    let err = svc.register_exit("ZZ-000").unwrap_err();
    let body = ErrorResponse::from(&err);
    assert_eq!(body.kind, ErrorKind::StateConflict);
    assert_eq!(body.message, "vehicle ZZ-000 is not parked");
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["kind"], "state_conflict");
}

#[tokio::test]
async fn test_revenue_question_with_huge_hour_count() {
    let (svc, clock) = service();
    svc.register_entry(&entry("AB-123")).unwrap();
    clock.advance(Duration::minutes(90));
    svc.register_exit("AB-123").unwrap();

    let answer = svc
        .answer_question("What's the revenue from the last 4000000000 hours?")
        .await;
    assert_eq!(answer.source, AnswerSource::Fallback);
    assert!(answer.text.contains("4000000000 hour"));
    assert!(answer.text.contains("$10.00"));
}

#[test]
fn test_exit_receipt_of_open_session_is_zero_length() {
    let (svc, _) = service();
    svc.register_entry(&entry("AB-123")).unwrap();
    let open = &svc.active_sessions()[0];
    let receipt = ExitReceipt::from(open);
    assert_eq!(receipt.exit_time, open.entry_time);
    assert_eq!(receipt.duration_minutes, 0);
    assert_eq!(receipt.fee, Decimal::ZERO);
}

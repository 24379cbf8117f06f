//! Tests for builders

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use parking_facility::builders::{build_agent, build_facility, build_service};
use parking_facility::config::{AgentBackendConfig, FacilityConfig};
use parking_facility::core::{PersistenceGateway, SpotType};
use parking_facility::infra::InMemoryGateway;
use parking_facility::util::ManualClock;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()))
}

#[test]
fn test_build_facility_initialises_layout_once() {
    let gateway = Arc::new(InMemoryGateway::new());
    let cfg = FacilityConfig::default();
    let facility = build_facility(&cfg, gateway.clone(), clock()).unwrap();
    assert_eq!(facility.total_spots(), 60);
    assert_eq!(gateway.load_spots().unwrap().len(), 60);

    // A different layout does not overwrite stored spots.
    let smaller = FacilityConfig {
        floors: 1,
        ..FacilityConfig::default()
    };
    let reloaded = build_facility(&smaller, gateway, clock()).unwrap();
    assert_eq!(reloaded.total_spots(), 60);
}

#[test]
fn test_build_facility_rejects_invalid_config() {
    let cfg = FacilityConfig {
        floors: 0,
        ..FacilityConfig::default()
    };
    let result = build_facility(&cfg, Arc::new(InMemoryGateway::new()), clock());
    assert!(result.is_err());
}

#[test]
fn test_build_agent_by_backend() {
    let mut cfg = FacilityConfig::default();
    assert_eq!(build_agent(&cfg).unwrap().name(), "direct");
    cfg.agent.backend = AgentBackendConfig::ChatCompletions;
    assert_eq!(build_agent(&cfg).unwrap().name(), "chat_completions");
}

#[test]
fn test_build_service() {
    let svc = build_service(&FacilityConfig::default(), Arc::new(InMemoryGateway::new()), clock())
        .unwrap();
    let facility = svc.facility();
    facility.register_entry("AB-1", "red", "Fiat", SpotType::Vip).unwrap();
    let health = svc.health();
    assert!(health.ok);
    assert_eq!(health.open_sessions, 1);
    assert!(!health.agent_enabled);
}

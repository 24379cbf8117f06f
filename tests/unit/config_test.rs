//! Tests for configuration validation

use parking_facility::config::{AgentBackendConfig, FacilityConfig};
use parking_facility::core::{ConfigError, SpotId, SpotType};
use rust_decimal::Decimal;

#[test]
fn test_default_config_is_valid() {
    let cfg = FacilityConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.hourly_rate, Decimal::new(5, 0));
    assert_eq!(cfg.minimum_billed_hours, 1);
    assert!(!cfg.agent_enabled);
}

#[test]
fn test_invalid_rate() {
    let cfg = FacilityConfig {
        hourly_rate: Decimal::ZERO,
        ..FacilityConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_dimensions() {
    let no_floors = FacilityConfig {
        floors: 0,
        ..FacilityConfig::default()
    };
    assert!(no_floors.validate().is_err());
    let no_spots = FacilityConfig {
        spots_per_floor: 0,
        ..FacilityConfig::default()
    };
    assert!(no_spots.validate().is_err());
}

#[test]
fn test_enabled_agent_needs_timeout() {
    let cfg = FacilityConfig {
        agent_enabled: true,
        agent_timeout_ms: 0,
        ..FacilityConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_layout_key_outside_facility() {
    let mut cfg = FacilityConfig {
        floors: 1,
        spots_per_floor: 4,
        ..FacilityConfig::default()
    };
    cfg.spot_type_layout.insert("2-01".to_string(), SpotType::Vip);
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("outside the facility"), "{err}");
}

#[test]
fn test_from_json_str() {
    let cfg = FacilityConfig::from_json_str(
        r#"{
            "hourly_rate": "3.50",
            "floors": 1,
            "spots_per_floor": 3,
            "spot_type_layout": { "1-3": "vip" },
            "default_layout": false,
            "agent_enabled": true,
            "agent": { "backend": "chat_completions", "model": "llama3" }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.hourly_rate, Decimal::new(350, 2));
    assert_eq!(cfg.agent.backend, AgentBackendConfig::ChatCompletions);
    assert_eq!(cfg.agent.model, "llama3");
    assert_eq!(cfg.agent.max_tool_rounds, 3);
    assert_eq!(cfg.spot_type_of(SpotId::new(1, 3)), SpotType::Vip);
    assert_eq!(cfg.spots().iter().filter(|s| s.spot_type == SpotType::Regular).count(), 2);
}

#[test]
fn test_from_json_str_errors() {
    assert!(matches!(
        FacilityConfig::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        FacilityConfig::from_json_str(r#"{ "floors": 0 }"#),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_minimum_billed_hours_overrides_ceiling() {
    let entry = chrono::DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let rate = Decimal::new(5, 0);

    let cfg = FacilityConfig::default();
    assert_eq!(cfg.fee_calculator().fee(entry, entry, rate).unwrap(), rate);

    let bare = FacilityConfig {
        minimum_billed_hours: 0,
        ..FacilityConfig::default()
    };
    assert_eq!(bare.fee_calculator().fee(entry, entry, rate).unwrap(), Decimal::ZERO);
}

//! Tests for configuration validation

use std::collections::HashMap;
use std::path::PathBuf;

use case_allocator::config::{
    AllocationPolicy, AppConfig, EngineConfig, SlaPolicy, StoreBackendConfig,
};
use case_allocator::core::Priority;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_engine_config_defaults() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert!((cfg.allocation.reserve_share - 0.10).abs() < f64::EPSILON);
    assert_eq!(cfg.allocation.min_reserve, 1);
    assert_eq!(cfg.sla.limit_hours(Priority::High), 24);
    assert_eq!(cfg.sla.limit_hours(Priority::Medium), 72);
    assert_eq!(cfg.sla.limit_hours(Priority::Low), 120);
    assert_eq!(cfg.seed.case_count, 20);
}

#[test]
fn test_engine_config_from_partial_json() {
    let cfg = EngineConfig::from_json_str(r#"{ "sla": { "high_hours": 12 } }"#).unwrap();
    assert_eq!(cfg.sla.high_hours, 12);
    assert_eq!(cfg.sla.medium_hours, 72);
    assert_eq!(cfg.allocation, AllocationPolicy::default());
}

#[test]
fn test_engine_config_invalid_share() {
    let err = EngineConfig::from_json_str(r#"{ "allocation": { "reserve_share": 1.5 } }"#)
        .unwrap_err();
    assert!(err.contains("reserve_share"));
}

#[test]
fn test_engine_config_invalid_bands() {
    let policy = AllocationPolicy {
        standard_score: 0.9,
        ..AllocationPolicy::default()
    };
    assert!(policy.validate().is_err());
}

#[test]
fn test_sla_policy_zero_limit() {
    let policy = SlaPolicy {
        medium_hours: 0,
        ..SlaPolicy::default()
    };
    assert!(policy.validate().is_err());
}

#[test]
fn test_engine_config_parse_error() {
    let err = EngineConfig::from_json_str("{").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_app_config_defaults() {
    let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg.store_backend, StoreBackendConfig::File);
    assert_eq!(cfg.store_path, PathBuf::from("data/case_store.json"));
    assert_eq!(cfg.registry_path, PathBuf::from("data/agencies.json"));
    assert_eq!(cfg.policy_path, None);
    assert_eq!(cfg.sweep_interval_secs, 300);
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn test_app_config_from_environment_values() {
    let cfg = AppConfig::from_lookup(lookup(&[
        ("CASE_STORE_BACKEND", "in_memory"),
        ("AGENCY_REGISTRY_PATH", "/srv/agencies.json"),
        ("ALLOCATION_POLICY_PATH", "/srv/policy.json"),
        ("SLA_SWEEP_INTERVAL_SECS", "60"),
        ("LOG_LEVEL", "debug"),
    ]))
    .unwrap();
    assert_eq!(cfg.store_backend, StoreBackendConfig::InMemory);
    assert_eq!(cfg.registry_path, PathBuf::from("/srv/agencies.json"));
    assert_eq!(cfg.policy_path, Some(PathBuf::from("/srv/policy.json")));
    assert_eq!(cfg.sweep_interval().as_secs(), 60);
    assert_eq!(cfg.log_level, "debug");
}

#[test]
fn test_app_config_rejects_bad_values() {
    assert!(AppConfig::from_lookup(lookup(&[("CASE_STORE_BACKEND", "postgres")])).is_err());
    assert!(AppConfig::from_lookup(lookup(&[("SLA_SWEEP_INTERVAL_SECS", "soon")])).is_err());
    assert!(AppConfig::from_lookup(lookup(&[("SLA_SWEEP_INTERVAL_SECS", "0")])).is_err());
}

#[test]
fn test_app_config_without_policy_file_uses_defaults() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.engine_config().unwrap(), EngineConfig::default());
}

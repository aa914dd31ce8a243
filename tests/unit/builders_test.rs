//! Tests for builder modules

use std::sync::Arc;

use case_allocator::builders::{build_from_app_config, ServiceBuilder};
use case_allocator::config::{AppConfig, EngineConfig, SlaPolicy, StoreBackendConfig};
use case_allocator::core::SchedulerError;
use case_allocator::infra::{InMemoryCaseStore, StaticRegistry};
use case_allocator::util::clock::ManualClock;
use chrono::{TimeZone, Utc};

#[test]
fn test_service_builder_defaults() {
    let service = ServiceBuilder::new(EngineConfig::default())
        .build(
            Arc::new(InMemoryCaseStore::new()),
            Arc::new(StaticRegistry::with_defaults()),
        )
        .unwrap();
    assert_eq!(service.config().seed.case_count, 20);
    assert_eq!(service.load_registry().unwrap().len(), 3);
}

#[test]
fn test_service_builder_rejects_invalid_config() {
    let engine = EngineConfig {
        sla: SlaPolicy {
            high_hours: 0,
            ..SlaPolicy::default()
        },
        ..EngineConfig::default()
    };
    let result = ServiceBuilder::new(engine).build(
        Arc::new(InMemoryCaseStore::new()),
        Arc::new(StaticRegistry::with_defaults()),
    );
    assert!(matches!(result, Err(SchedulerError::Backend(msg)) if msg.contains("config invalid")));
}

#[test]
fn test_service_builder_uses_supplied_clock() {
    let at = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
    let service = ServiceBuilder::new(EngineConfig::default())
        .with_clock(Arc::new(ManualClock::new(at)))
        .build(
            Arc::new(InMemoryCaseStore::new()),
            Arc::new(StaticRegistry::with_defaults()),
        )
        .unwrap();
    service.ingest_synthetic().unwrap();
    let case = service.case("case-1").unwrap();
    assert_eq!(case.assigned_at.as_deref(), Some("2026-07-01T08:00:00.000Z"));
}

#[test]
fn test_build_from_app_config_in_memory() {
    let cfg = AppConfig {
        store_backend: StoreBackendConfig::InMemory,
        registry_path: "does/not/exist.json".into(),
        ..AppConfig::default()
    };
    let service = build_from_app_config(&cfg).unwrap();
    assert!(matches!(
        service.check_sla(),
        Err(SchedulerError::RegistryUnavailable(_))
    ));
}

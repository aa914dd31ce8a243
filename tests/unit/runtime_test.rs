//! Tests for runtime response models

use std::sync::Arc;

use case_allocator::builders::ServiceBuilder;
use case_allocator::config::EngineConfig;
use case_allocator::core::{ReallocationOutcome, SchedulerError};
use case_allocator::infra::{InMemoryCaseStore, StaticRegistry};
use case_allocator::runtime::{case_status, health};

#[test]
fn test_case_status_for_unknown_case() {
    let service = ServiceBuilder::new(EngineConfig::default())
        .build(
            Arc::new(InMemoryCaseStore::new()),
            Arc::new(StaticRegistry::with_defaults()),
        )
        .unwrap();
    assert!(matches!(
        case_status(&service, "case-404"),
        Err(SchedulerError::CaseNotFound(_))
    ));
    let probe = health(&service);
    assert!(probe.ok);
    assert_eq!(probe.cases, 0);
}

#[test]
fn test_outcomes_serialize_with_a_tag() {
    let swapped = ReallocationOutcome::Swapped {
        agency_id: "user-agency-beta".into(),
        displaced_case_id: "case-17".into(),
    };
    let json = serde_json::to_value(&swapped).unwrap();
    assert_eq!(json["outcome"], "swapped");
    assert_eq!(json["displaced_case_id"], "case-17");
    assert_eq!(
        serde_json::to_value(ReallocationOutcome::AwaitingCapacity).unwrap()["outcome"],
        "awaiting_capacity"
    );
}

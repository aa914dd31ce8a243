//! End-to-end flows through the service: progress updates, capacity
//! reporting and the file-backed configuration path.

mod common;

use std::path::Path;

use case_allocator::builders::build_from_app_config;
use case_allocator::config::{AppConfig, StoreBackendConfig};
use case_allocator::core::{AgencyTier, AuditAction, CaseStatus, SchedulerError, SlaStatus};
use case_allocator::infra::default_agencies;
use case_allocator::runtime::{case_status, health};
use common::*;

#[test]
fn test_progress_to_wip_then_ptp() {
    let h = default_harness();
    place(&h, "case-1", 80.0, BETA, 2);

    let wip = h
        .service
        .record_progress("case-1", BETA, CaseStatus::Wip)
        .unwrap();
    assert_eq!(wip.status, CaseStatus::Wip);
    assert_eq!(wip.current_sla_status, SlaStatus::Active);

    let ptp = h
        .service
        .record_progress("case-1", BETA, CaseStatus::Ptp)
        .unwrap();
    assert_eq!(ptp.status, CaseStatus::Ptp);
    assert!((ptp.ai_score - 95.0).abs() < f64::EPSILON);
    assert!((ptp.recovery_probability - 0.95).abs() < 1e-9);
    // Priority is fixed at creation.
    assert_eq!(ptp.priority.label(), "MEDIUM");

    let actions: Vec<AuditAction> = h
        .service
        .audit_trail("case-1")
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec![AuditAction::StatusChange, AuditAction::PromiseToPay]);
    assert_eq!(active_count(&h, BETA), 1);
}

#[test]
fn test_ptp_score_is_capped() {
    let h = default_harness();
    place(&h, "case-1", 93.0, ALPHA, 1);
    let ptp = h
        .service
        .record_progress("case-1", ALPHA, CaseStatus::Ptp)
        .unwrap();
    assert!((ptp.ai_score - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_invalid_progress_is_rejected() {
    let h = default_harness();
    place(&h, "case-1", 80.0, BETA, 2);

    let err = h
        .service
        .record_progress("case-1", ALPHA, CaseStatus::Wip)
        .unwrap_err();
    assert!(matches!(err, SchedulerError::NotAssignee { .. }));

    let err = h
        .service
        .record_progress("case-1", BETA, CaseStatus::Revoked)
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::InvalidTransition {
            from: CaseStatus::Assigned,
            to: CaseStatus::Revoked,
            ..
        }
    ));

    h.service
        .record_progress("case-1", BETA, CaseStatus::Ptp)
        .unwrap();
    let err = h
        .service
        .record_progress("case-1", BETA, CaseStatus::Wip)
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidTransition { .. }));
}

#[test]
fn test_capacity_report_after_ingest() {
    let h = default_harness();
    h.service.ingest_synthetic().unwrap();
    let report = h.service.capacity_report().unwrap();
    assert_eq!(report.len(), 3);

    let alpha = report.iter().find(|r| r.id == ALPHA).unwrap();
    assert_eq!((alpha.active, alpha.high, alpha.high_threshold, alpha.free), (4, 3, 3, 0));
    assert_eq!(alpha.tier, AgencyTier::Established);

    let gamma = report.iter().find(|r| r.id == GAMMA).unwrap();
    assert_eq!(gamma.tier, AgencyTier::Probationary);
    assert_eq!((gamma.active, gamma.high, gamma.high_threshold), (3, 1, 1));
}

#[test]
fn test_case_status_and_health() {
    let h = default_harness();
    h.service.ingest_synthetic().unwrap();
    let status = case_status(&h.service, "case-7").unwrap();
    assert_eq!(status.case.assigned_to_id.as_deref(), Some(ALPHA));
    assert_eq!(status.audit.len(), 1);

    let probe = health(&h.service);
    assert!(probe.ok);
    assert_eq!((probe.agencies, probe.cases), (3, 20));
}

fn write_registry(path: &Path) {
    let json = serde_json::to_string_pretty(&default_agencies()).unwrap();
    std::fs::write(path, json).unwrap();
}

fn file_config(dir: &Path) -> AppConfig {
    AppConfig {
        store_backend: StoreBackendConfig::File,
        store_path: dir.join("store").join("case_store.json"),
        registry_path: dir.join("agencies.json"),
        ..AppConfig::default()
    }
}

#[test]
fn test_file_backend_persists_between_service_instances() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = file_config(dir.path());
    write_registry(&cfg.registry_path);

    let first = build_from_app_config(&cfg).unwrap();
    first.ingest_synthetic().unwrap();
    first.reject("case-1", ALPHA, "duplicate account").unwrap();

    let second = build_from_app_config(&cfg).unwrap();
    let c = second.case("case-1").unwrap();
    assert_eq!(c.status, CaseStatus::Queued);
    let trail = second.audit_trail("case-1").unwrap();
    assert_eq!(trail[1].action, AuditAction::Rejection);
    assert_eq!(trail[1].details, "duplicate account");
    assert!(cfg.store_path.exists());
}

#[test]
fn test_missing_registry_fails_before_touching_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = file_config(dir.path());
    let service = build_from_app_config(&cfg).unwrap();

    let err = service.ingest_synthetic().unwrap_err();
    assert!(matches!(err, SchedulerError::RegistryUnavailable(_)));
    assert!(!cfg.store_path.exists());
    assert!(!health(&service).ok);
}

#[test]
fn test_policy_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = file_config(dir.path());
    write_registry(&cfg.registry_path);
    let policy = dir.path().join("policy.json");
    std::fs::write(&policy, r#"{ "seed": { "case_count": 5 } }"#).unwrap();
    cfg.policy_path = Some(policy);

    let service = build_from_app_config(&cfg).unwrap();
    assert_eq!(service.ingest_synthetic().unwrap().allocation.cases, 5);
}

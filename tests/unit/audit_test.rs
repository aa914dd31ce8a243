//! Tests for audit entries

use case_allocator::core::{build_audit_entry, AuditAction, AuditLogEntry, AuditSink, SYSTEM_ACTOR};
use chrono::{TimeZone, Utc};

#[test]
fn test_vec_audit_sink() {
    let mut sink: Vec<AuditLogEntry> = Vec::new();
    let at = Utc.with_ymd_and_hms(2026, 5, 4, 10, 15, 0).unwrap();

    sink.record(build_audit_entry(
        "case-1",
        SYSTEM_ACTOR,
        AuditAction::Assignment,
        "Initial allocation to user-agency-alpha",
        at,
    ));
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].case_id, "case-1");
    assert_eq!(sink[0].action, AuditAction::Assignment);
    assert_eq!(sink[0].timestamp, "2026-05-04T10:15:00.000Z");
}

#[test]
fn test_entry_ids_are_unique() {
    let at = Utc::now();
    let a = build_audit_entry("case-1", SYSTEM_ACTOR, AuditAction::QueueWait, "", at);
    let b = build_audit_entry("case-1", SYSTEM_ACTOR, AuditAction::QueueWait, "", at);
    assert_ne!(a.id, b.id);
    assert!(uuid::Uuid::parse_str(&a.id).is_ok());
}

#[test]
fn test_entry_serializes_with_store_column_names() {
    let entry = build_audit_entry("case-2", "user-agency-beta", AuditAction::Rejection, "busy", Utc::now());
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["caseId"], "case-2");
    assert_eq!(json["actorId"], "user-agency-beta");
    assert_eq!(json["action"], "REJECTION");
}

#[test]
fn test_only_rejection_actions_mark_rejectors() {
    assert!(AuditAction::Rejection.is_rejection());
    assert!(AuditAction::Rejected.is_rejection());
    assert!(!AuditAction::Displacement.is_rejection());
    assert!(!AuditAction::QueueReturn.is_rejection());
}

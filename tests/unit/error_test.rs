//! Tests for error types

use case_allocator::core::{CaseStatus, SchedulerError};

#[test]
fn test_case_not_found_error() {
    let err = SchedulerError::CaseNotFound("case-9".to_string());
    assert_eq!(format!("{}", err), "case not found: case-9");
}

#[test]
fn test_registry_unavailable_error() {
    let err = SchedulerError::RegistryUnavailable("data/agencies.json: no such file".to_string());
    assert_eq!(
        format!("{}", err),
        "agency registry unavailable: data/agencies.json: no such file"
    );
}

#[test]
fn test_invalid_transition_error() {
    let err = SchedulerError::InvalidTransition {
        case_id: "case-1".to_string(),
        from: CaseStatus::Ptp,
        to: CaseStatus::Wip,
    };
    assert_eq!(format!("{}", err), "case case-1 cannot move from PTP to WIP");
}

#[test]
fn test_not_assignee_error() {
    let err = SchedulerError::NotAssignee {
        case_id: "case-1".to_string(),
        agency_id: "user-agency-beta".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "case case-1 is not assigned to user-agency-beta"
    );
}

#[test]
fn test_backend_error() {
    let err = SchedulerError::Backend("connection failed".to_string());
    assert_eq!(format!("{}", err), "backend error: connection failed");
}

#[test]
fn test_errors_convert_into_anyhow() {
    let err: anyhow::Error = SchedulerError::Conflict("case case-1".to_string()).into();
    assert!(matches!(
        err.downcast_ref::<SchedulerError>(),
        Some(SchedulerError::Conflict(_))
    ));
}

//! API-facing response models.

use serde::Serialize;

use crate::core::{
    AllocationService, AuditLogEntry, Case, CaseStore, RegistrySource, SchedulerError,
};

/// A case together with its audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct CaseStatusResponse {
    /// Current case record.
    pub case: Case,
    /// Audit entries for the case, oldest first.
    pub audit: Vec<AuditLogEntry>,
}

/// Health response.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    /// Registry and store both readable.
    pub ok: bool,
    /// Eligible agencies in the current registry.
    pub agencies: usize,
    /// Cases in the store.
    pub cases: usize,
    /// Failure description when not ok.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetch a case and its audit trail.
pub fn case_status<S, R>(
    service: &AllocationService<S, R>,
    case_id: &str,
) -> Result<CaseStatusResponse, SchedulerError>
where
    S: CaseStore,
    R: RegistrySource,
{
    Ok(CaseStatusResponse {
        case: service.case(case_id)?,
        audit: service.audit_trail(case_id)?,
    })
}

/// Probe the registry and the store.
pub fn health<S, R>(service: &AllocationService<S, R>) -> Health
where
    S: CaseStore,
    R: RegistrySource,
{
    let probe = service.load_registry().and_then(|registry| {
        let cases = service.store().read(|tx| Ok(tx.cases().len()))?;
        Ok((registry.len(), cases))
    });
    match probe {
        Ok((agencies, cases)) => Health {
            ok: true,
            agencies,
            cases,
            error: None,
        },
        Err(err) => Health {
            ok: false,
            agencies: 0,
            cases: 0,
            error: Some(err.to_string()),
        },
    }
}

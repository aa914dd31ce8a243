//! Error types for scheduler operations.

use thiserror::Error;

use super::domain::CaseStatus;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No case with the given id exists in the store.
    #[error("case not found: {0}")]
    CaseNotFound(String),
    /// A record with the same identity already exists.
    #[error("conflict: {0} already exists")]
    Conflict(String),
    /// The agency registry source could not be read.
    #[error("agency registry unavailable: {0}")]
    RegistryUnavailable(String),
    /// The requested lifecycle change is not allowed from the current state.
    #[error("case {case_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Case identifier.
        case_id: String,
        /// Current status.
        from: CaseStatus,
        /// Requested status.
        to: CaseStatus,
    },
    /// The acting agency does not hold the case.
    #[error("case {case_id} is not assigned to {agency_id}")]
    NotAssignee {
        /// Case identifier.
        case_id: String,
        /// Agency that attempted the change.
        agency_id: String,
    },
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

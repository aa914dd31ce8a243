//! Audit trail entries.
//!
//! Every state-changing action appends one entry. The trail is append-only and
//! doubles as the rejection history consulted by reallocation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AgencyId, CaseId};
use crate::util::clock::format_timestamp;

/// Actor token for allocator and reallocation decisions.
pub const SYSTEM_ACTOR: &str = "SYSTEM";
/// Actor token for the SLA monitor.
pub const SLA_DAEMON_ACTOR: &str = "SYSTEM_DAEMON";

/// Kind of action recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Case offered to an agency by the batch allocator.
    Assignment,
    /// Agency declined the case.
    Rejection,
    /// Older spelling of a rejection; counted the same way.
    Rejected,
    /// LOW case bumped to make room for higher-priority work.
    Displacement,
    /// Case moved to a new agency after a rejection.
    Reallocation,
    /// LOW case sent back to the queue after a rejection.
    QueueReturn,
    /// No eligible agency had room; case waits in the queue.
    QueueWait,
    /// Assignment revoked after exceeding its SLA limit.
    SlaBreach,
    /// Agency started working the case.
    StatusChange,
    /// Promise to pay logged.
    #[serde(rename = "PTP")]
    PromiseToPay,
}

impl AuditAction {
    /// Whether the entry marks its actor as a rejector of the case.
    pub const fn is_rejection(self) -> bool {
        matches!(self, Self::Rejection | Self::Rejected)
    }
}

/// One row of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Entry identifier (UUID v4).
    pub id: String,
    /// Case the action applies to.
    pub case_id: CaseId,
    /// Agency id or system actor token.
    pub actor_id: String,
    /// Action tag.
    pub action: AuditAction,
    /// Free-text context.
    pub details: String,
    /// When the action happened.
    pub timestamp: String,
}

/// Append-only destination for audit entries.
pub trait AuditSink {
    /// Record an audit entry.
    fn record(&mut self, entry: AuditLogEntry);
}

impl AuditSink for Vec<AuditLogEntry> {
    fn record(&mut self, entry: AuditLogEntry) {
        self.push(entry);
    }
}

/// Helper to build an audit entry with a fresh id.
pub fn build_audit_entry(
    case_id: impl Into<CaseId>,
    actor_id: impl Into<String>,
    action: AuditAction,
    details: impl Into<String>,
    at: DateTime<Utc>,
) -> AuditLogEntry {
    AuditLogEntry {
        id: uuid::Uuid::new_v4().to_string(),
        case_id: case_id.into(),
        actor_id: actor_id.into(),
        action,
        details: details.into(),
        timestamp: format_timestamp(at),
    }
}

/// Actors that have rejected `case_id`, per the trail.
pub fn rejectors<'a>(
    entries: impl IntoIterator<Item = &'a AuditLogEntry>,
    case_id: &str,
) -> BTreeSet<AgencyId> {
    entries
        .into_iter()
        .filter(|entry| entry.case_id == case_id && entry.action.is_rejection())
        .map(|entry| entry.actor_id.clone())
        .collect()
}

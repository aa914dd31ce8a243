//! SLA sweep over running assignments.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::agency::AgencyRegistry;
use super::audit::{build_audit_entry, AuditAction, AuditSink, SLA_DAEMON_ACTOR};
use super::domain::CaseId;
use super::error::SchedulerError;
use super::store::StoreTransaction;
use crate::config::SlaPolicy;

/// Name used in breach entries when the holder is not in the registry.
pub const UNKNOWN_AGENCY: &str = "Unknown Agency";

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlaSweepReport {
    /// ASSIGNED/ACTIVE cases looked at.
    pub examined: usize,
    /// Cases revoked by this sweep.
    pub revoked: Vec<CaseId>,
    /// Cases skipped because `assignedAt` was missing or unreadable.
    pub skipped: Vec<CaseId>,
}

/// Revokes assignments that ran past their priority's limit.
pub struct SlaMonitor<'a> {
    registry: &'a AgencyRegistry,
    policy: &'a SlaPolicy,
}

impl<'a> SlaMonitor<'a> {
    /// Create a monitor over a registry snapshot.
    pub const fn new(registry: &'a AgencyRegistry, policy: &'a SlaPolicy) -> Self {
        Self { registry, policy }
    }

    /// Sweep every ASSIGNED/ACTIVE case as of `now`. Never reallocates.
    pub fn sweep(
        &self,
        tx: &mut StoreTransaction,
        now: DateTime<Utc>,
    ) -> Result<SlaSweepReport, SchedulerError> {
        let mut report = SlaSweepReport::default();
        for mut case in tx.active_assignments() {
            report.examined += 1;
            let Some(assigned_at) = case.assigned_at_utc() else {
                tracing::warn!("case {} has no readable assignedAt; skipping", case.id);
                report.skipped.push(case.id);
                continue;
            };
            let limit = self.policy.limit_hours(case.priority);
            if now - assigned_at <= TimeDelta::hours(i64::from(limit)) {
                continue;
            }

            let agency_name = case
                .assigned_to_id
                .as_deref()
                .and_then(|id| self.registry.get(id))
                .map_or(UNKNOWN_AGENCY, |agency| agency.name.as_str())
                .to_string();
            let case_id = case.id.clone();
            case.revoke(now);
            tx.update_case(case)?;
            tx.record(build_audit_entry(
                case_id.clone(),
                SLA_DAEMON_ACTOR,
                AuditAction::SlaBreach,
                format!("Offer revoked. Timeout > {limit}h. Agency {agency_name} penalized."),
                now,
            ));
            tracing::info!("revoked case {case_id} from {agency_name} after {limit}h");
            report.revoked.push(case_id);
        }
        Ok(report)
    }
}

//! Per-case reassignment after an agency declines work.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::agency::{Agency, AgencyRegistry};
use super::audit::{build_audit_entry, AuditAction, AuditSink, SYSTEM_ACTOR};
use super::domain::{AgencyId, CaseId, Priority};
use super::error::SchedulerError;
use super::store::StoreTransaction;

/// What happened to a reallocated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReallocationOutcome {
    /// LOW case sent back to the queue.
    ReturnedToQueue,
    /// Moved to an agency with free capacity.
    Reallocated {
        /// Receiving agency.
        agency_id: AgencyId,
    },
    /// Moved to a full agency by bumping one of its LOW cases.
    Swapped {
        /// Receiving agency.
        agency_id: AgencyId,
        /// LOW case sent back to the queue.
        displaced_case_id: CaseId,
    },
    /// Every non-rejecting agency was full with nothing to displace.
    AwaitingCapacity,
}

/// Reassigns a single case, honoring the rejection history.
pub struct ReallocationEngine<'a> {
    registry: &'a AgencyRegistry,
}

impl<'a> ReallocationEngine<'a> {
    /// Create an engine over a registry snapshot.
    pub const fn new(registry: &'a AgencyRegistry) -> Self {
        Self { registry }
    }

    /// Reallocate `case_id` after `rejecting_agency_id` declined it.
    pub fn reallocate(
        &self,
        tx: &mut StoreTransaction,
        case_id: &str,
        rejecting_agency_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReallocationOutcome, SchedulerError> {
        let mut case = tx.require_case(case_id)?;
        tracing::info!(
            "reallocating case {case_id} (priority {}) rejected by {rejecting_agency_id}",
            case.priority
        );

        if case.priority == Priority::Low {
            case.return_to_queue(now);
            tx.update_case(case)?;
            tx.record(build_audit_entry(
                case_id,
                SYSTEM_ACTOR,
                AuditAction::QueueReturn,
                "Low priority rejection. Returned to Queue.",
                now,
            ));
            return Ok(ReallocationOutcome::ReturnedToQueue);
        }

        // The case's own slot must not count against its current holder.
        if case.assigned_to_id.is_some() {
            case.return_to_queue(now);
            tx.update_case(case.clone())?;
        }

        let mut excluded = tx.rejectors(case_id);
        excluded.insert(rejecting_agency_id.to_string());

        let Some((agency, victim)) = self.pick_target(tx, &excluded) else {
            case.return_to_queue(now);
            tx.update_case(case)?;
            tx.record(build_audit_entry(
                case_id,
                SYSTEM_ACTOR,
                AuditAction::QueueWait,
                "All eligible agencies full or rejected. Queued.",
                now,
            ));
            tracing::info!("case {case_id} queued; {} agencies excluded", excluded.len());
            return Ok(ReallocationOutcome::AwaitingCapacity);
        };

        if let Some(victim_id) = &victim {
            let mut displaced = tx.require_case(victim_id)?;
            displaced.return_to_queue(now);
            tx.update_case(displaced)?;
            tx.record(build_audit_entry(
                victim_id.clone(),
                SYSTEM_ACTOR,
                AuditAction::Displacement,
                format!("Displaced by High Priority Case {case_id}. Sent to Queue."),
                now,
            ));
        }

        case.assign(agency.id.clone(), now);
        tx.update_case(case)?;
        let details = if victim.is_some() {
            format!("Swapped into {} (Displaced Low Case).", agency.name)
        } else {
            format!("Reallocated to {}.", agency.name)
        };
        tx.record(build_audit_entry(
            case_id,
            SYSTEM_ACTOR,
            AuditAction::Reallocation,
            details,
            now,
        ));

        Ok(match victim {
            Some(displaced_case_id) => ReallocationOutcome::Swapped {
                agency_id: agency.id.clone(),
                displaced_case_id,
            },
            None => ReallocationOutcome::Reallocated {
                agency_id: agency.id.clone(),
            },
        })
    }

    /// First non-excluded agency, by descending score, with room or a LOW case to bump.
    fn pick_target(
        &self,
        tx: &StoreTransaction,
        excluded: &std::collections::BTreeSet<AgencyId>,
    ) -> Option<(&'a Agency, Option<CaseId>)> {
        for agency in self.registry.ranked() {
            if excluded.contains(&agency.id) {
                continue;
            }
            if tx.agency_load(&agency.id).total < agency.total_capacity {
                return Some((agency, None));
            }
            if let Some(victim) = tx.displaceable_case(&agency.id) {
                return Some((agency, Some(victim.id.clone())));
            }
        }
        None
    }
}

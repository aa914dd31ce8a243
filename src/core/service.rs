//! Entry points of the scheduler.
//!
//! Every method loads a fresh registry snapshot, then runs exactly one store
//! transaction. A registry failure aborts before the transaction opens.

use std::sync::Arc;

use serde::Serialize;

use super::agency::{AgencyRegistry, AgencyTier, RegistrySource};
use super::allocator::{
    apply_plan, high_priority_threshold, BatchAllocator, BatchPlan, LoadLedger, PendingCase,
};
use super::audit::{build_audit_entry, AuditAction, AuditLogEntry, AuditSink};
use super::domain::{AgencyId, Case, CaseId, CaseStatus, UserRecord, UserRole};
use super::error::SchedulerError;
use super::reallocation::{ReallocationEngine, ReallocationOutcome};
use super::seed::{synthetic_queue, SeedCase};
use super::sla::{SlaMonitor, SlaSweepReport};
use super::store::CaseStore;
use crate::config::EngineConfig;
use crate::util::clock::{format_timestamp, Clock, SystemClock};

/// Id of the internal manager seeded by ingestion.
pub const MANAGER_USER_ID: &str = "user-internal-mgr";
/// Display name of the internal manager.
pub const MANAGER_USER_NAME: &str = "Collections Manager";
/// aiScore bonus applied when a promise to pay is logged.
pub const PTP_SCORE_BONUS: f64 = 15.0;

/// Summary of one batch allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationReport {
    /// Cases considered.
    pub cases: usize,
    /// Cases assigned (reservations included).
    pub assigned: usize,
    /// Assignments made through the probationary reservation.
    pub reserved: usize,
    /// Cases left waiting in the queue.
    pub queued: Vec<CaseId>,
}

impl AllocationReport {
    fn from_plan(cases: usize, plan: &BatchPlan) -> Self {
        Self {
            cases,
            assigned: plan.assignments.len(),
            reserved: plan.reserved_count(),
            queued: plan.unassigned.clone(),
        }
    }
}

/// Result of [`AllocationService::ingest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Users seeded (agencies plus the manager).
    pub users: usize,
    /// Allocation of the fresh queue.
    pub allocation: AllocationReport,
}

/// Capacity view of one agency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyCapacity {
    /// Agency id.
    pub id: AgencyId,
    /// Display name.
    pub name: String,
    /// Tier.
    pub tier: AgencyTier,
    /// Normalized score.
    pub score: f64,
    /// Total capacity.
    pub capacity: u32,
    /// Active cases held.
    pub active: u32,
    /// Active HIGH cases held.
    pub high: u32,
    /// HIGH cases allowed through the main pass.
    pub high_threshold: u32,
    /// Remaining capacity.
    pub free: u32,
}

/// Scheduler façade over a case store and an agency registry source.
pub struct AllocationService<S, R> {
    store: Arc<S>,
    registry: Arc<R>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S, R> AllocationService<S, R>
where
    S: CaseStore,
    R: RegistrySource,
{
    /// Create a service using the system clock.
    pub fn new(store: Arc<S>, registry: Arc<R>, config: EngineConfig) -> Self {
        Self {
            store,
            registry,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Engine configuration in use.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fresh registry snapshot.
    pub fn load_registry(&self) -> Result<AgencyRegistry, SchedulerError> {
        AgencyRegistry::load(self.registry.as_ref())
    }

    /// Wipe the store, seed users and allocate `cases` as a fresh batch.
    pub fn ingest(&self, cases: Vec<SeedCase>) -> Result<IngestReport, SchedulerError> {
        let registry = self.load_registry()?;
        let now = self.clock.now();
        let names: Vec<&str> = registry.agencies().iter().map(|a| a.name.as_str()).collect();
        tracing::info!("ingesting {} cases with agencies {:?}", cases.len(), names);

        let queue: Vec<PendingCase> = cases
            .iter()
            .map(|case| PendingCase::new(case.id.clone(), case.priority()))
            .collect();
        let plan = BatchAllocator::new(&registry, &self.config.allocation)
            .plan(&queue, LoadLedger::empty());

        let report = self.store.transaction(|tx| {
            tx.reset();
            for agency in registry.agencies() {
                tx.insert_user(UserRecord::new(
                    agency.id.clone(),
                    agency.name.clone(),
                    UserRole::Agency,
                ))?;
            }
            tx.insert_user(UserRecord::new(
                MANAGER_USER_ID,
                MANAGER_USER_NAME,
                UserRole::Manager,
            ))?;
            for seed in cases {
                let (invoice, case) = seed.into_records(now);
                tx.insert_invoice(invoice)?;
                tx.insert_case(case)?;
            }
            apply_plan(tx, &plan, now, |a| format!("Initial allocation to {}", a.agency_id))?;
            Ok(IngestReport {
                users: tx.state().users.len(),
                allocation: AllocationReport::from_plan(queue.len(), &plan),
            })
        })?;
        tracing::info!(
            "ingestion complete: {} assigned, {} queued",
            report.allocation.assigned,
            report.allocation.queued.len()
        );
        Ok(report)
    }

    /// Ingest the configured number of synthetic cases.
    pub fn ingest_synthetic(&self) -> Result<IngestReport, SchedulerError> {
        self.ingest(synthetic_queue(self.config.seed.case_count, self.clock.now()))
    }

    /// Allocate every unassigned NEW/QUEUED case (and REVOKED ones when asked)
    /// against live agency load.
    pub fn allocate_backlog(
        &self,
        include_revoked: bool,
    ) -> Result<AllocationReport, SchedulerError> {
        let registry = self.load_registry()?;
        let now = self.clock.now();
        let allocator = BatchAllocator::new(&registry, &self.config.allocation);
        let report = self.store.transaction(|tx| {
            let queue: Vec<PendingCase> = tx
                .backlog(include_revoked)
                .into_iter()
                .map(|case| PendingCase::new(case.id.clone(), case.priority))
                .collect();
            if queue.is_empty() {
                return Ok(AllocationReport::default());
            }
            tracing::info!("found {} unassigned cases; running allocation", queue.len());
            let plan = allocator.plan(&queue, LoadLedger::with_persisted(tx.load_by_agency()));
            apply_plan(tx, &plan, now, |a| format!("Auto-allocated to {}", a.agency_id))?;
            Ok(AllocationReport::from_plan(queue.len(), &plan))
        })?;
        if report.cases == 0 {
            tracing::info!("no unassigned cases found");
        }
        Ok(report)
    }

    /// Reallocate `case_id` after `rejecting_agency_id` declined it.
    pub fn reallocate(
        &self,
        case_id: &str,
        rejecting_agency_id: &str,
    ) -> Result<ReallocationOutcome, SchedulerError> {
        let registry = self.load_registry()?;
        let now = self.clock.now();
        let engine = ReallocationEngine::new(&registry);
        self.store
            .transaction(|tx| engine.reallocate(tx, case_id, rejecting_agency_id, now))
    }

    /// Record a rejection by the holding agency and reallocate the case.
    pub fn reject(
        &self,
        case_id: &str,
        agency_id: &str,
        reason: &str,
    ) -> Result<ReallocationOutcome, SchedulerError> {
        let registry = self.load_registry()?;
        let now = self.clock.now();
        let engine = ReallocationEngine::new(&registry);
        self.store.transaction(|tx| {
            let mut case = tx.require_case(case_id)?;
            if !case.is_held_by(agency_id) {
                return Err(SchedulerError::NotAssignee {
                    case_id: case_id.to_string(),
                    agency_id: agency_id.to_string(),
                });
            }
            tx.record(build_audit_entry(
                case_id,
                agency_id,
                AuditAction::Rejection,
                reason,
                now,
            ));
            case.return_to_queue(now);
            tx.update_case(case)?;
            engine.reallocate(tx, case_id, agency_id, now)
        })
    }

    /// Revoke assignments past their SLA limit.
    pub fn check_sla(&self) -> Result<SlaSweepReport, SchedulerError> {
        let registry = self.load_registry()?;
        let now = self.clock.now();
        let monitor = SlaMonitor::new(&registry, &self.config.sla);
        let report = self.store.transaction(|tx| monitor.sweep(tx, now))?;
        tracing::info!(
            "SLA check complete: examined {}, revoked {}",
            report.examined,
            report.revoked.len()
        );
        Ok(report)
    }

    /// Apply a progress update (WIP or PTP) reported by the holding agency.
    pub fn record_progress(
        &self,
        case_id: &str,
        agency_id: &str,
        target: CaseStatus,
    ) -> Result<Case, SchedulerError> {
        let now = self.clock.now();
        self.store.transaction(|tx| {
            let mut case = tx.require_case(case_id)?;
            if !case.is_held_by(agency_id) {
                return Err(SchedulerError::NotAssignee {
                    case_id: case_id.to_string(),
                    agency_id: agency_id.to_string(),
                });
            }
            let (action, details) = match (case.status, target) {
                (CaseStatus::Assigned, CaseStatus::Wip) => (
                    AuditAction::StatusChange,
                    format!("Status changed {} -> {}.", case.status, target),
                ),
                (CaseStatus::Assigned | CaseStatus::Wip, CaseStatus::Ptp) => {
                    case.ai_score = (case.ai_score + PTP_SCORE_BONUS).min(100.0);
                    case.recovery_probability = case.ai_score / 100.0;
                    (AuditAction::PromiseToPay, "Promise to pay logged.".to_string())
                }
                (from, to) => {
                    return Err(SchedulerError::InvalidTransition {
                        case_id: case_id.to_string(),
                        from,
                        to,
                    })
                }
            };
            case.status = target;
            case.updated_at = format_timestamp(now);
            tx.update_case(case.clone())?;
            tx.record(build_audit_entry(case_id, agency_id, action, details, now));
            Ok(case)
        })
    }

    /// Current load and headroom for every loaded agency.
    pub fn capacity_report(&self) -> Result<Vec<AgencyCapacity>, SchedulerError> {
        let registry = self.load_registry()?;
        let policy = &self.config.allocation;
        self.store.read(|tx| {
            let loads = tx.load_by_agency();
            Ok(registry
                .agencies()
                .iter()
                .map(|agency| {
                    let load = loads.get(&agency.id).copied().unwrap_or_default();
                    AgencyCapacity {
                        id: agency.id.clone(),
                        name: agency.name.clone(),
                        tier: agency.status,
                        score: agency.score,
                        capacity: agency.total_capacity,
                        active: load.total,
                        high: load.high,
                        high_threshold: high_priority_threshold(agency, policy),
                        free: agency.total_capacity.saturating_sub(load.total),
                    }
                })
                .collect())
        })
    }

    /// Look up a case.
    pub fn case(&self, case_id: &str) -> Result<Case, SchedulerError> {
        self.store.read(|tx| tx.require_case(case_id))
    }

    /// Audit entries for a case, oldest first.
    pub fn audit_trail(&self, case_id: &str) -> Result<Vec<AuditLogEntry>, SchedulerError> {
        self.store.read(|tx| {
            tx.require_case(case_id)?;
            Ok(tx.audit_for_case(case_id).cloned().collect())
        })
    }
}

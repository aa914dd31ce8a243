//! Batch allocation of a pending case queue.
//!
//! Planning is pure: given the queue, the registry snapshot, the persisted load
//! and the policy, [`BatchAllocator::plan`] decides every assignment. Decisions
//! later in the pass depend on counters bumped earlier in the same pass, which
//! is why the loop is strictly sequential. [`apply_plan`] then writes the
//! outcome into an open transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::agency::{Agency, AgencyRegistry};
use super::audit::{build_audit_entry, AuditAction, AuditSink, SYSTEM_ACTOR};
use super::domain::{AgencyId, CaseId, CaseStatus, Priority, SlaStatus};
use super::error::SchedulerError;
use super::store::StoreTransaction;
use crate::config::AllocationPolicy;

/// Active case counts for one agency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgencyLoad {
    /// All active cases.
    pub total: u32,
    /// Active HIGH-priority cases.
    pub high: u32,
}

impl AgencyLoad {
    /// Count one more case of `priority`.
    pub fn add(&mut self, priority: Priority) {
        self.total += 1;
        if matches!(priority, Priority::High) {
            self.high += 1;
        }
    }

    const fn merged(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            high: self.high + other.high,
        }
    }
}

/// Load accumulator for one allocation pass: persisted baseline plus
/// assignments made so far in the batch.
#[derive(Debug, Clone, Default)]
pub struct LoadLedger {
    persisted: HashMap<AgencyId, AgencyLoad>,
    batch: HashMap<AgencyId, AgencyLoad>,
}

impl LoadLedger {
    /// Ledger with no persisted load (fresh ingestion).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ledger seeded with load read from the store.
    pub fn with_persisted(persisted: HashMap<AgencyId, AgencyLoad>) -> Self {
        Self {
            persisted,
            batch: HashMap::new(),
        }
    }

    /// Persisted plus batch load for `agency_id`.
    pub fn current(&self, agency_id: &str) -> AgencyLoad {
        let persisted = self.persisted.get(agency_id).copied().unwrap_or_default();
        persisted.merged(self.batch(agency_id))
    }

    /// Load added by this batch only.
    pub fn batch(&self, agency_id: &str) -> AgencyLoad {
        self.batch.get(agency_id).copied().unwrap_or_default()
    }

    /// Record a batch assignment.
    pub fn record(&mut self, agency_id: &str, priority: Priority) {
        self.batch
            .entry(agency_id.to_string())
            .or_default()
            .add(priority);
    }
}

/// Case waiting for allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCase {
    /// Case identifier.
    pub id: CaseId,
    /// Priority band.
    pub priority: Priority,
}

impl PendingCase {
    /// Create a pending case entry.
    pub fn new(id: impl Into<CaseId>, priority: Priority) -> Self {
        Self {
            id: id.into(),
            priority,
        }
    }
}

/// One decided assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Case identifier.
    pub case_id: CaseId,
    /// Receiving agency.
    pub agency_id: AgencyId,
    /// Made through the probationary reservation rather than the main pass.
    pub reserved: bool,
}

/// Outcome of planning one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// Assignments in decision order (reservations first).
    pub assignments: Vec<Assignment>,
    /// Cases no agency could take, in main-pass order.
    pub unassigned: Vec<CaseId>,
}

impl BatchPlan {
    /// Agency chosen for `case_id`, if any.
    pub fn agency_for(&self, case_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|assignment| assignment.case_id == case_id)
            .map(|assignment| assignment.agency_id.as_str())
    }

    /// Number of probationary reservations.
    pub fn reserved_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.reserved).count()
    }
}

/// Maximum HIGH cases `agency` may hold through the main pass.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn high_priority_threshold(agency: &Agency, policy: &AllocationPolicy) -> u32 {
    let capacity = f64::from(agency.total_capacity);
    let share = if agency.score > policy.premium_score {
        policy.premium_high_share
    } else if agency.score > policy.standard_score {
        policy.standard_high_share
    } else {
        return 0;
    };
    // capacity <= u32::MAX and share <= 1, so the floor fits.
    (capacity * share).floor() as u32
}

/// Number of MEDIUM cases reserved for probationary agencies.
pub fn reserve_count(total_cases: usize, policy: &AllocationPolicy) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let share = (total_cases as f64 * policy.reserve_share).floor() as usize;
    share.max(policy.min_reserve)
}

/// Greedy, single-pass batch allocator.
pub struct BatchAllocator<'a> {
    registry: &'a AgencyRegistry,
    policy: &'a AllocationPolicy,
}

impl<'a> BatchAllocator<'a> {
    /// Create an allocator over a registry snapshot.
    pub const fn new(registry: &'a AgencyRegistry, policy: &'a AllocationPolicy) -> Self {
        Self { registry, policy }
    }

    /// Decide assignments for `queue`, layering batch load over `ledger`.
    pub fn plan(&self, queue: &[PendingCase], mut ledger: LoadLedger) -> BatchPlan {
        let mut plan = BatchPlan::default();
        let mut remaining: Vec<&PendingCase> = queue.iter().collect();

        self.reserve_for_probationary(&mut remaining, &mut ledger, &mut plan);

        remaining.sort_by_key(|case| case.priority.rank());
        let ranked = self.registry.ranked();

        for case in remaining {
            let target = ranked
                .iter()
                .find(|agency| self.accepts(agency, case.priority, &ledger));
            match target {
                Some(agency) => {
                    ledger.record(&agency.id, case.priority);
                    plan.assignments.push(Assignment {
                        case_id: case.id.clone(),
                        agency_id: agency.id.clone(),
                        reserved: false,
                    });
                }
                None => plan.unassigned.push(case.id.clone()),
            }
        }

        tracing::debug!(
            "planned {} assignments ({} reserved), {} unassigned",
            plan.assignments.len(),
            plan.reserved_count(),
            plan.unassigned.len()
        );
        plan
    }

    /// Carve MEDIUM cases off the tail of the queue for probationary agencies.
    /// Capacity and HIGH thresholds are not checked here.
    fn reserve_for_probationary(
        &self,
        remaining: &mut Vec<&PendingCase>,
        ledger: &mut LoadLedger,
        plan: &mut BatchPlan,
    ) {
        let newcomers = self.registry.probationary();
        if newcomers.is_empty() {
            return;
        }
        let quota = reserve_count(remaining.len(), self.policy);
        let mut booked = 0;
        let mut index = remaining.len();
        while index > 0 && booked < quota {
            index -= 1;
            if remaining[index].priority != Priority::Medium {
                continue;
            }
            let agency = newcomers[booked % newcomers.len()];
            let case = remaining.remove(index);
            ledger.record(&agency.id, case.priority);
            plan.assignments.push(Assignment {
                case_id: case.id.clone(),
                agency_id: agency.id.clone(),
                reserved: true,
            });
            booked += 1;
        }
    }

    fn accepts(&self, agency: &Agency, priority: Priority, ledger: &LoadLedger) -> bool {
        let load = ledger.current(&agency.id);
        if load.total >= agency.total_capacity {
            return false;
        }
        if priority == Priority::High {
            return load.high < high_priority_threshold(agency, self.policy);
        }
        true
    }
}

/// Write a plan into the store: assigned cases go ASSIGNED/ACTIVE with an
/// ASSIGNMENT entry, everything else in the plan goes QUEUED/PENDING.
pub fn apply_plan(
    tx: &mut StoreTransaction,
    plan: &BatchPlan,
    now: DateTime<Utc>,
    describe: impl Fn(&Assignment) -> String,
) -> Result<(), SchedulerError> {
    for assignment in &plan.assignments {
        let mut case = tx.require_case(&assignment.case_id)?;
        case.assign(assignment.agency_id.clone(), now);
        tx.update_case(case)?;
        tx.record(build_audit_entry(
            assignment.case_id.clone(),
            SYSTEM_ACTOR,
            AuditAction::Assignment,
            describe(assignment),
            now,
        ));
    }
    for case_id in &plan.unassigned {
        let mut case = tx.require_case(case_id)?;
        if case.status == CaseStatus::Queued && case.current_sla_status == SlaStatus::Pending {
            continue;
        }
        case.return_to_queue(now);
        tx.update_case(case)?;
    }
    Ok(())
}

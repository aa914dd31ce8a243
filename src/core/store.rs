//! Case store contract and transactional working set.
//!
//! Backends hand a [`StoreTransaction`] to a closure. The transaction owns a
//! private copy of the stored state; the backend publishes it only when the
//! closure returns `Ok`, so a failed call leaves nothing behind.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::allocator::AgencyLoad;
use super::audit::{self, AuditLogEntry, AuditSink};
use super::domain::{AgencyId, Case, CaseStatus, Invoice, Priority, SlaStatus, UserRecord};
use super::error::SchedulerError;

/// Everything the case store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    /// Cases in creation order.
    #[serde(default)]
    pub cases: Vec<Case>,
    /// Invoices in creation order.
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    /// Seeded users.
    #[serde(default)]
    pub users: Vec<UserRecord>,
    /// Append-only audit trail.
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
}

/// Storage abstraction so the scheduling components can run against any backend.
pub trait CaseStore: Send + Sync {
    /// Run `work` atomically. Mutations are published only if it returns `Ok`.
    fn transaction<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&mut StoreTransaction) -> Result<T, SchedulerError>;

    /// Run `work` against committed state without publishing anything.
    fn read<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&StoreTransaction) -> Result<T, SchedulerError>;
}

/// Working copy of the store inside one transaction.
#[derive(Debug)]
pub struct StoreTransaction {
    state: StoreState,
}

impl StoreTransaction {
    /// Open a transaction over a copy of committed state.
    pub const fn new(state: StoreState) -> Self {
        Self { state }
    }

    /// Consume the transaction, yielding the state to publish.
    pub fn into_state(self) -> StoreState {
        self.state
    }

    /// Read-only view of the working state.
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    /// Drop every case, invoice, user and audit entry.
    pub fn reset(&mut self) {
        self.state = StoreState::default();
    }

    /// All cases in creation order.
    pub fn cases(&self) -> &[Case] {
        &self.state.cases
    }

    /// Look up a case.
    pub fn case(&self, id: &str) -> Option<&Case> {
        self.state.cases.iter().find(|case| case.id == id)
    }

    /// Look up a case, failing with `CaseNotFound`.
    pub fn require_case(&self, id: &str) -> Result<Case, SchedulerError> {
        self.case(id)
            .cloned()
            .ok_or_else(|| SchedulerError::CaseNotFound(id.to_string()))
    }

    /// Insert a new case.
    pub fn insert_case(&mut self, case: Case) -> Result<(), SchedulerError> {
        if self.case(&case.id).is_some() {
            return Err(SchedulerError::Conflict(format!("case {}", case.id)));
        }
        self.state.cases.push(case);
        Ok(())
    }

    /// Replace a stored case with `case`.
    pub fn update_case(&mut self, case: Case) -> Result<(), SchedulerError> {
        let slot = self
            .state
            .cases
            .iter_mut()
            .find(|stored| stored.id == case.id)
            .ok_or_else(|| SchedulerError::CaseNotFound(case.id.clone()))?;
        *slot = case;
        Ok(())
    }

    /// Insert a new invoice.
    pub fn insert_invoice(&mut self, invoice: Invoice) -> Result<(), SchedulerError> {
        if self
            .state
            .invoices
            .iter()
            .any(|stored| stored.invoice_number == invoice.invoice_number)
        {
            return Err(SchedulerError::Conflict(format!(
                "invoice {}",
                invoice.invoice_number
            )));
        }
        self.state.invoices.push(invoice);
        Ok(())
    }

    /// Insert a new user.
    pub fn insert_user(&mut self, user: UserRecord) -> Result<(), SchedulerError> {
        if self.state.users.iter().any(|stored| stored.id == user.id) {
            return Err(SchedulerError::Conflict(format!("user {}", user.id)));
        }
        self.state.users.push(user);
        Ok(())
    }

    /// Audit entries for one case, oldest first.
    pub fn audit_for_case<'a>(
        &'a self,
        case_id: &'a str,
    ) -> impl Iterator<Item = &'a AuditLogEntry> + 'a {
        self.state
            .audit_log
            .iter()
            .filter(move |entry| entry.case_id == case_id)
    }

    /// Agencies recorded as having rejected `case_id`.
    pub fn rejectors(&self, case_id: &str) -> BTreeSet<AgencyId> {
        audit::rejectors(&self.state.audit_log, case_id)
    }

    /// Active (ASSIGNED/WIP/PTP) load currently held by one agency.
    pub fn agency_load(&self, agency_id: &str) -> AgencyLoad {
        self.state
            .cases
            .iter()
            .filter(|case| case.is_held_by(agency_id))
            .fold(AgencyLoad::default(), |mut load, case| {
                load.add(case.priority);
                load
            })
    }

    /// Active load for every agency holding at least one case.
    pub fn load_by_agency(&self) -> HashMap<AgencyId, AgencyLoad> {
        let mut loads: HashMap<AgencyId, AgencyLoad> = HashMap::new();
        for case in &self.state.cases {
            if !case.status.is_active() {
                continue;
            }
            if let Some(agency_id) = &case.assigned_to_id {
                loads.entry(agency_id.clone()).or_default().add(case.priority);
            }
        }
        loads
    }

    /// LOW case at `agency_id` that may be bumped for higher-priority work.
    ///
    /// Only ASSIGNED and WIP cases qualify. The oldest assignment goes first;
    /// cases without a readable `assignedAt` come last, then ties break on id.
    pub fn displaceable_case(&self, agency_id: &str) -> Option<&Case> {
        self.state
            .cases
            .iter()
            .filter(|case| {
                case.priority == Priority::Low
                    && matches!(case.status, CaseStatus::Assigned | CaseStatus::Wip)
                    && case.assigned_to_id.as_deref() == Some(agency_id)
            })
            .min_by(|a, b| {
                let key = |case: &Case| (case.assigned_at_utc().is_none(), case.assigned_at_utc());
                key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
            })
    }

    /// Unassigned cases waiting for an agency, in creation order.
    pub fn backlog(&self, include_revoked: bool) -> Vec<&Case> {
        self.state
            .cases
            .iter()
            .filter(|case| case.assigned_to_id.is_none())
            .filter(|case| match case.status {
                CaseStatus::New | CaseStatus::Queued => true,
                CaseStatus::Revoked => include_revoked,
                _ => false,
            })
            .collect()
    }

    /// Cases with status ASSIGNED and an ACTIVE SLA clock.
    pub fn active_assignments(&self) -> Vec<Case> {
        self.state
            .cases
            .iter()
            .filter(|case| {
                case.status == CaseStatus::Assigned && case.current_sla_status == SlaStatus::Active
            })
            .cloned()
            .collect()
    }
}

impl AuditSink for StoreTransaction {
    fn record(&mut self, entry: AuditLogEntry) {
        self.state.audit_log.push(entry);
    }
}

//! Core scheduling model, allocation algorithms and the service façade.

pub mod agency;
pub mod allocator;
pub mod audit;
pub mod domain;
pub mod error;
pub mod reallocation;
pub mod seed;
pub mod service;
pub mod sla;
pub mod store;

pub use agency::{Agency, AgencyRecord, AgencyRegistry, AgencyTier, RecordStatus, RegistrySource};
pub use allocator::{
    apply_plan, high_priority_threshold, reserve_count, AgencyLoad, Assignment, BatchAllocator,
    BatchPlan, LoadLedger, PendingCase,
};
pub use audit::{
    build_audit_entry, AuditAction, AuditLogEntry, AuditSink, SLA_DAEMON_ACTOR, SYSTEM_ACTOR,
};
pub use domain::{
    AgencyId, Case, CaseId, CaseStatus, Invoice, Priority, SlaStatus, UserRecord, UserRole,
};
pub use error::{AppResult, SchedulerError};
pub use reallocation::{ReallocationEngine, ReallocationOutcome};
pub use seed::{synthetic_queue, SeedCase};
pub use service::{AgencyCapacity, AllocationReport, AllocationService, IngestReport};
pub use sla::{SlaMonitor, SlaSweepReport};
pub use store::{CaseStore, StoreState, StoreTransaction};

//! # Case Allocator
//!
//! A capacity- and priority-aware scheduler that assigns collection cases to
//! servicing agencies, reclaims them when an SLA runs out, and reassigns them
//! when an agency declines.
//!
//! ## Components
//!
//! - **Agency registry**: a snapshot of eligible agencies, loaded once per
//!   entry point from a [`core::RegistrySource`].
//! - **Case store**: persisted cases, invoices, users and the audit trail,
//!   mutated only inside [`core::CaseStore::transaction`].
//! - **Batch allocator**: probationary reservation followed by a greedy,
//!   score-ordered main pass with per-agency HIGH-priority thresholds.
//! - **Reallocation engine**: per-case reassignment that skips every agency
//!   that already rejected the case and may displace LOW work.
//! - **SLA monitor**: revokes assignments that outlived their priority's
//!   limit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use case_allocator::builders::ServiceBuilder;
//! use case_allocator::config::EngineConfig;
//! use case_allocator::infra::{InMemoryCaseStore, StaticRegistry};
//!
//! let service = ServiceBuilder::new(EngineConfig::default()).build(
//!     Arc::new(InMemoryCaseStore::new()),
//!     Arc::new(StaticRegistry::with_defaults()),
//! )?;
//! let report = service.ingest_synthetic()?;
//! let outcome = service.reject("case-1", "user-agency-alpha", "Debtor disputes invoice")?;
//! let sweep = service.check_sla()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Builders to construct the allocation service from configuration.
pub mod builders;
/// Configuration models for policy, storage and runtime settings.
pub mod config;
/// Domain model, scheduling algorithms and the service façade.
pub mod core;
/// Storage and registry adapters.
pub mod infra;
/// Response models and the periodic SLA watcher.
pub mod runtime;
/// Shared utilities.
pub mod util;

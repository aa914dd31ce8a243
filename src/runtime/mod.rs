//! Runtime surface: response models and the periodic SLA watcher.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod daemon;

pub use api::{case_status, health, CaseStatusResponse, Health};
#[cfg(feature = "tokio-runtime")]
pub use daemon::{run_sla_watcher, WatchSummary};

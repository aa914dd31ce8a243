//! Configuration models for allocation policy, stores and runtime settings.

pub mod app;
pub mod policy;

pub use app::{AppConfig, StoreBackendConfig};
pub use policy::{AllocationPolicy, EngineConfig, SeedConfig, SlaPolicy};

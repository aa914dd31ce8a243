//! Storage and registry adapters.

pub mod registry;
pub mod store;

pub use registry::{default_agencies, JsonFileRegistry, StaticRegistry};
pub use store::{ConfiguredStore, InMemoryCaseStore, JsonFileStore};

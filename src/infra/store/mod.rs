//! Case store backends.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryCaseStore;

use crate::config::{AppConfig, StoreBackendConfig};
use crate::core::{CaseStore, SchedulerError, StoreTransaction};

/// Store selected at startup from [`AppConfig`].
#[derive(Debug)]
pub enum ConfiguredStore {
    /// Process-local store.
    InMemory(InMemoryCaseStore),
    /// JSON file store.
    File(JsonFileStore),
}

impl ConfiguredStore {
    /// Open the backend named by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, SchedulerError> {
        match config.store_backend {
            StoreBackendConfig::InMemory => Ok(Self::InMemory(InMemoryCaseStore::new())),
            StoreBackendConfig::File => JsonFileStore::open(&config.store_path).map(Self::File),
        }
    }
}

impl CaseStore for ConfiguredStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&mut StoreTransaction) -> Result<T, SchedulerError>,
    {
        match self {
            Self::InMemory(store) => store.transaction(work),
            Self::File(store) => store.transaction(work),
        }
    }

    fn read<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&StoreTransaction) -> Result<T, SchedulerError>,
    {
        match self {
            Self::InMemory(store) => store.read(work),
            Self::File(store) => store.read(work),
        }
    }
}

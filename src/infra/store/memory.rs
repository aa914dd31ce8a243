//! In-memory case store for development and tests.

use parking_lot::Mutex;

use crate::core::{CaseStore, SchedulerError, StoreState, StoreTransaction};

/// Case store held in process memory. Transactions are serialized by a mutex
/// held for their whole duration.
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    state: Mutex<StoreState>,
}

impl InMemoryCaseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `state`.
    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> StoreState {
        self.state.lock().clone()
    }
}

impl CaseStore for InMemoryCaseStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&mut StoreTransaction) -> Result<T, SchedulerError>,
    {
        let mut committed = self.state.lock();
        let mut tx = StoreTransaction::new(committed.clone());
        let value = work(&mut tx)?;
        *committed = tx.into_state();
        Ok(value)
    }

    fn read<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&StoreTransaction) -> Result<T, SchedulerError>,
    {
        let committed = self.state.lock();
        work(&StoreTransaction::new(committed.clone()))
    }
}

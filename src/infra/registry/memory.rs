//! Registry source backed by a fixed list of records.

use parking_lot::RwLock;

use crate::core::{AgencyRecord, RecordStatus, RegistrySource, SchedulerError};

/// The three agencies shipped with the default data set.
pub fn default_agencies() -> Vec<AgencyRecord> {
    [
        ("user-agency-alpha", "Alpha Collections", 92.0, 4),
        ("user-agency-beta", "Beta Recovery", 78.0, 5),
        ("user-agency-gamma", "Gamma Partners", 60.0, 3),
    ]
    .into_iter()
    .map(|(id, name, score, capacity)| AgencyRecord {
        id: id.to_string(),
        name: name.to_string(),
        score: Some(score),
        capacity: Some(capacity),
        status: RecordStatus::Active,
        history: Vec::new(),
    })
    .collect()
}

/// In-memory registry source. Records can be replaced between runs to mimic
/// the external scoring tool rewriting the registry.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    records: RwLock<Vec<AgencyRecord>>,
}

impl StaticRegistry {
    /// Source returning `records`.
    pub fn new(records: Vec<AgencyRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Source returning [`default_agencies`].
    pub fn with_defaults() -> Self {
        Self::new(default_agencies())
    }

    /// Replace every record.
    pub fn replace(&self, records: Vec<AgencyRecord>) {
        *self.records.write() = records;
    }
}

impl RegistrySource for StaticRegistry {
    fn load_records(&self) -> Result<Vec<AgencyRecord>, SchedulerError> {
        Ok(self.records.read().clone())
    }
}

//! Registry source reading a JSON array of agency records.

use std::path::{Path, PathBuf};

use crate::core::{AgencyRecord, RegistrySource, SchedulerError};

/// Registry file rewritten out-of-band by the scoring tool.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    /// Source reading `path` on every load.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistrySource for JsonFileRegistry {
    fn load_records(&self) -> Result<Vec<AgencyRecord>, SchedulerError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            SchedulerError::RegistryUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            SchedulerError::RegistryUnavailable(format!("{}: {e}", self.path.display()))
        })
    }
}

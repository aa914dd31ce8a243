//! Application settings read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::policy::EngineConfig;

/// Default location of the JSON case store.
pub const DEFAULT_STORE_PATH: &str = "data/case_store.json";
/// Default location of the agency registry file.
pub const DEFAULT_REGISTRY_PATH: &str = "data/agencies.json";
/// Default seconds between SLA sweeps in watch mode.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Case store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// JSON file persisted between invocations.
    #[default]
    File,
    /// Process-local store for development/testing.
    InMemory,
}

impl FromStr for StoreBackendConfig {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "in_memory" | "memory" => Ok(Self::InMemory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

/// Settings for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Case store backend.
    pub store_backend: StoreBackendConfig,
    /// Case store file (file backend only).
    pub store_path: PathBuf,
    /// Agency registry file.
    pub registry_path: PathBuf,
    /// Optional engine policy file.
    pub policy_path: Option<PathBuf>,
    /// Seconds between SLA sweeps in watch mode.
    pub sweep_interval_secs: u64,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackendConfig::File,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            policy_path: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, String> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(format!(".env could not be loaded: {err}"));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();
        let store_backend = match lookup("CASE_STORE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.store_backend,
        };
        let sweep_interval_secs = match lookup("SLA_SWEEP_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| format!("SLA_SWEEP_INTERVAL_SECS `{raw}`: {e}"))?,
            None => defaults.sweep_interval_secs,
        };
        let cfg = Self {
            store_backend,
            store_path: lookup("CASE_STORE_PATH").map_or(defaults.store_path, PathBuf::from),
            registry_path: lookup("AGENCY_REGISTRY_PATH")
                .map_or(defaults.registry_path, PathBuf::from),
            policy_path: lookup("ALLOCATION_POLICY_PATH")
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from),
            sweep_interval_secs,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".into());
        }
        if self.store_backend == StoreBackendConfig::File
            && self.store_path.as_os_str().is_empty()
        {
            return Err("store_path must be set for the file backend".into());
        }
        Ok(())
    }

    /// Interval between SLA sweeps.
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Engine configuration from `policy_path`, or defaults when unset.
    pub fn engine_config(&self) -> Result<EngineConfig, String> {
        let Some(path) = &self.policy_path else {
            return Ok(EngineConfig::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("policy file {}: {e}", path.display()))?;
        EngineConfig::from_json_str(&raw)
    }
}

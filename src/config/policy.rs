//! Allocation and SLA policy structures.

use serde::{Deserialize, Serialize};

use crate::core::domain::Priority;

/// Knobs for the batch allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationPolicy {
    /// Share of a batch reserved for probationary agencies.
    pub reserve_share: f64,
    /// Minimum number of reservations per batch.
    pub min_reserve: usize,
    /// Scores strictly above this use `premium_high_share`.
    pub premium_score: f64,
    /// Share of capacity premium agencies may fill with HIGH cases.
    pub premium_high_share: f64,
    /// Scores strictly above this (and not premium) use `standard_high_share`.
    pub standard_score: f64,
    /// Share of capacity standard agencies may fill with HIGH cases.
    pub standard_high_share: f64,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            reserve_share: 0.10,
            min_reserve: 1,
            premium_score: 0.8,
            premium_high_share: 0.75,
            standard_score: 0.5,
            standard_high_share: 0.40,
        }
    }
}

impl AllocationPolicy {
    /// Validate policy values.
    pub fn validate(&self) -> Result<(), String> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(format!("{name} must be within [0, 1], got {value}"))
            }
        };
        unit("reserve_share", self.reserve_share)?;
        unit("premium_score", self.premium_score)?;
        unit("premium_high_share", self.premium_high_share)?;
        unit("standard_score", self.standard_score)?;
        unit("standard_high_share", self.standard_high_share)?;
        if self.standard_score > self.premium_score {
            return Err("standard_score must not exceed premium_score".into());
        }
        Ok(())
    }
}

/// Per-priority SLA limits in hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaPolicy {
    /// Limit for HIGH cases.
    pub high_hours: u32,
    /// Limit for MEDIUM cases.
    pub medium_hours: u32,
    /// Limit for LOW and anything else.
    pub default_hours: u32,
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            high_hours: 24,
            medium_hours: 72,
            default_hours: 120,
        }
    }
}

impl SlaPolicy {
    /// Limit that applies to `priority`.
    pub const fn limit_hours(&self, priority: Priority) -> u32 {
        match priority {
            Priority::High => self.high_hours,
            Priority::Medium => self.medium_hours,
            Priority::Low => self.default_hours,
        }
    }

    /// Validate SLA limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.high_hours == 0 || self.medium_hours == 0 || self.default_hours == 0 {
            return Err("SLA limits must be greater than 0".into());
        }
        Ok(())
    }
}

/// Synthetic queue settings used by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Number of cases generated per ingestion.
    pub case_count: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { case_count: 20 }
    }
}

/// Root engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Batch allocator policy.
    pub allocation: AllocationPolicy,
    /// SLA monitor limits.
    pub sla: SlaPolicy,
    /// Ingestion seed settings.
    pub seed: SeedConfig,
}

impl EngineConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.allocation
            .validate()
            .map_err(|e| format!("allocation policy invalid: {e}"))?;
        self.sla
            .validate()
            .map_err(|e| format!("sla policy invalid: {e}"))?;
        if self.seed.case_count == 0 {
            return Err("seed.case_count must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse engine configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

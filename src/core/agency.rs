//! Agency registry snapshot.
//!
//! Agencies are loaded from a [`RegistrySource`] once per entry-point call and
//! passed by reference into every scheduling component. Scores are rewritten
//! out-of-band by the external performance-analysis tool and only become
//! visible on the next load.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::AgencyId;
use super::error::SchedulerError;

/// Raw performance at or below which an agency is probationary.
pub const PROBATIONARY_CEILING: f64 = 60.0;
/// Raw performance assumed when a record carries no score or history.
pub const FALLBACK_RAW_SCORE: f64 = 60.0;

/// Performance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgencyTier {
    /// Raw performance above 60.
    Established,
    /// Raw performance of 60 or below; eligible for reserved work.
    Probationary,
}

impl AgencyTier {
    /// Tier for a raw (0-100) performance score.
    pub fn from_raw_score(raw: f64) -> Self {
        if raw > PROBATIONARY_CEILING {
            Self::Established
        } else {
            Self::Probationary
        }
    }
}

impl fmt::Display for AgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Established => f.write_str("Established"),
            Self::Probationary => f.write_str("Probationary"),
        }
    }
}

/// Eligible agency, as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    /// Stable identifier.
    pub id: AgencyId,
    /// Display name.
    pub name: String,
    /// Normalized performance in [0, 1].
    pub score: f64,
    /// Maximum concurrent active cases.
    pub total_capacity: u32,
    /// Derived tier.
    pub status: AgencyTier,
}

impl Agency {
    /// Build an agency from a raw (0-100) performance score.
    pub fn from_raw(
        id: impl Into<AgencyId>,
        name: impl Into<String>,
        raw_score: f64,
        total_capacity: u32,
    ) -> Self {
        let raw = raw_score.clamp(0.0, 100.0);
        Self {
            id: id.into(),
            name: name.into(),
            score: raw / 100.0,
            total_capacity,
            status: AgencyTier::from_raw_score(raw),
        }
    }

    /// Whether the agency is in the probationary tier.
    pub fn is_probationary(&self) -> bool {
        self.status == AgencyTier::Probationary
    }
}

/// Activity flag on a registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Eligible for work.
    #[default]
    Active,
    /// Soft-deleted; filtered out on load.
    Inactive,
}

/// Agency record as stored by the backing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyRecord {
    /// Stable identifier.
    pub id: AgencyId,
    /// Display name.
    pub name: String,
    /// Latest raw performance (0-100).
    #[serde(default)]
    pub score: Option<f64>,
    /// Explicit capacity; derived from the score when absent.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Activity flag.
    #[serde(default)]
    pub status: RecordStatus,
    /// Monthly raw performance, oldest first.
    #[serde(default)]
    pub history: Vec<f64>,
}

impl AgencyRecord {
    /// Latest raw performance: the score, else the newest history point, else 60.
    pub fn raw_score(&self) -> f64 {
        self.score
            .or_else(|| self.history.last().copied())
            .unwrap_or(FALLBACK_RAW_SCORE)
    }

    /// Configured capacity, or the default band for the raw score.
    pub fn effective_capacity(&self) -> u32 {
        self.capacity
            .unwrap_or_else(|| default_capacity(self.raw_score()))
    }
}

/// Capacity assigned to agencies that do not declare one.
pub fn default_capacity(raw_score: f64) -> u32 {
    if raw_score >= 85.0 {
        5
    } else if raw_score >= 75.0 {
        4
    } else {
        3
    }
}

/// Backing source of agency records.
pub trait RegistrySource: Send + Sync {
    /// Fetch every record, active or not.
    fn load_records(&self) -> Result<Vec<AgencyRecord>, SchedulerError>;
}

/// Immutable set of eligible agencies for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgencyRegistry {
    agencies: Vec<Agency>,
}

impl AgencyRegistry {
    /// Load, filter and normalize agencies from `source`.
    pub fn load(source: &dyn RegistrySource) -> Result<Self, SchedulerError> {
        let records = source.load_records()?;
        let registry = Self::from_records(records);
        tracing::debug!("loaded {} eligible agencies", registry.len());
        Ok(registry)
    }

    /// Filter and normalize raw records.
    pub fn from_records(records: impl IntoIterator<Item = AgencyRecord>) -> Self {
        let agencies = records
            .into_iter()
            .filter(|record| record.status == RecordStatus::Active)
            .filter_map(|record| {
                let capacity = record.effective_capacity();
                if capacity == 0 {
                    tracing::warn!("agency {} has zero capacity; skipping", record.id);
                    return None;
                }
                Some(Agency::from_raw(
                    record.id.clone(),
                    record.name.clone(),
                    record.raw_score(),
                    capacity,
                ))
            })
            .collect();
        Self { agencies }
    }

    /// Wrap already-normalized agencies.
    pub const fn from_agencies(agencies: Vec<Agency>) -> Self {
        Self { agencies }
    }

    /// All agencies in source order.
    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    /// Look up an agency by id.
    pub fn get(&self, id: &str) -> Option<&Agency> {
        self.agencies.iter().find(|agency| agency.id == id)
    }

    /// Agencies ordered by descending score; ties keep source order.
    pub fn ranked(&self) -> Vec<&Agency> {
        let mut ranked: Vec<&Agency> = self.agencies.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Probationary agencies in source order.
    pub fn probationary(&self) -> Vec<&Agency> {
        self.agencies
            .iter()
            .filter(|agency| agency.is_probationary())
            .collect()
    }

    /// Number of eligible agencies.
    pub fn len(&self) -> usize {
        self.agencies.len()
    }

    /// Whether no agency is eligible.
    pub fn is_empty(&self) -> bool {
        self.agencies.is_empty()
    }
}

//! Case, invoice and user records plus their lifecycle enums.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::clock::{format_timestamp, parse_timestamp};

/// Case identifier.
pub type CaseId = String;
/// Agency identifier (doubles as the agency's user id).
pub type AgencyId = String;

/// aiScore at or above which a case is HIGH priority.
pub const HIGH_PRIORITY_SCORE: f64 = 85.0;
/// aiScore at or above which a case is MEDIUM priority.
pub const MEDIUM_PRIORITY_SCORE: f64 = 70.0;

/// Case priority, derived once from the aiScore at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// aiScore >= 85.
    High,
    /// 70 <= aiScore < 85.
    Medium,
    /// Everything else.
    Low,
}

impl Priority {
    /// Derive the priority band for an aiScore.
    pub fn from_ai_score(score: f64) -> Self {
        if score >= HIGH_PRIORITY_SCORE {
            Self::High
        } else if score >= MEDIUM_PRIORITY_SCORE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Sort key: HIGH first.
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Stored label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    /// Created, never offered.
    New,
    /// Waiting for an agency.
    Queued,
    /// Offered to an agency; the SLA clock is running.
    Assigned,
    /// Agency is working the case.
    Wip,
    /// Debtor promised to pay.
    Ptp,
    /// Reclaimed after an SLA breach.
    Revoked,
}

impl CaseStatus {
    /// Whether the case counts against its agency's capacity.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Assigned | Self::Wip | Self::Ptp)
    }

    /// Stored label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Queued => "QUEUED",
            Self::Assigned => "ASSIGNED",
            Self::Wip => "WIP",
            Self::Ptp => "PTP",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// SLA tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaStatus {
    /// No SLA clock running.
    Pending,
    /// SLA clock running against the current assignment.
    Active,
    /// Limit exceeded; the assignment was revoked.
    Breached,
}

/// A unit of collection work against one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Case identifier.
    pub id: CaseId,
    /// Owning invoice record.
    pub invoice_id: String,
    /// Priority-influencing score, 0-100.
    pub ai_score: f64,
    /// `ai_score / 100`.
    pub recovery_probability: f64,
    /// Priority band fixed at creation.
    pub priority: Priority,
    /// Lifecycle state.
    pub status: CaseStatus,
    /// Agency currently holding the case.
    pub assigned_to_id: Option<AgencyId>,
    /// When the current assignment started. Kept as text; see [`Case::assigned_at_utc`].
    pub assigned_at: Option<String>,
    /// SLA state.
    #[serde(rename = "currentSLAStatus")]
    pub current_sla_status: SlaStatus,
    /// Creation time.
    pub created_at: String,
    /// Last mutation time.
    pub updated_at: String,
}

impl Case {
    /// Create a NEW case with its priority derived from `ai_score`.
    pub fn new(
        id: impl Into<CaseId>,
        invoice_id: impl Into<String>,
        ai_score: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let stamp = format_timestamp(now);
        Self {
            id: id.into(),
            invoice_id: invoice_id.into(),
            ai_score,
            recovery_probability: ai_score / 100.0,
            priority: Priority::from_ai_score(ai_score),
            status: CaseStatus::New,
            assigned_to_id: None,
            assigned_at: None,
            current_sla_status: SlaStatus::Pending,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// Parsed assignment time; `None` when missing or malformed.
    pub fn assigned_at_utc(&self) -> Option<DateTime<Utc>> {
        self.assigned_at.as_deref().and_then(parse_timestamp)
    }

    /// Whether the case is held by `agency_id` and counts against its capacity.
    pub fn is_held_by(&self, agency_id: &str) -> bool {
        self.status.is_active() && self.assigned_to_id.as_deref() == Some(agency_id)
    }

    /// Offer the case to an agency and start the SLA clock.
    pub fn assign(&mut self, agency_id: impl Into<AgencyId>, now: DateTime<Utc>) {
        let stamp = format_timestamp(now);
        self.status = CaseStatus::Assigned;
        self.assigned_to_id = Some(agency_id.into());
        self.assigned_at = Some(stamp.clone());
        self.current_sla_status = SlaStatus::Active;
        self.updated_at = stamp;
    }

    /// Put the case back in the queue with no holder and no SLA clock.
    pub fn return_to_queue(&mut self, now: DateTime<Utc>) {
        self.status = CaseStatus::Queued;
        self.assigned_to_id = None;
        self.assigned_at = None;
        self.current_sla_status = SlaStatus::Pending;
        self.updated_at = format_timestamp(now);
    }

    /// Reclaim the case after an SLA breach.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        self.status = CaseStatus::Revoked;
        self.current_sla_status = SlaStatus::Breached;
        self.assigned_to_id = None;
        self.updated_at = format_timestamp(now);
    }
}

/// Invoice backing a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Record id (UUID).
    pub id: String,
    /// Business invoice number, e.g. `INV-2026-001`.
    pub invoice_number: String,
    /// Outstanding amount.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Due date (`YYYY-MM-DDT00:00:00.000Z`).
    pub due_date: String,
    /// Customer identifier.
    #[serde(rename = "customerID")]
    pub customer_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// Sales region.
    pub region: String,
    /// Invoice state, `OPEN` for seeded invoices.
    pub status: String,
    /// Creation time.
    pub created_at: String,
    /// Last mutation time.
    pub updated_at: String,
}

/// Role of a seeded user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Login for a servicing agency.
    Agency,
    /// Internal collections manager.
    Manager,
}

/// Login record seeded alongside agencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User id; equals the agency id for agency users.
    pub id: String,
    /// Derived e-mail address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: UserRole,
}

impl UserRecord {
    /// Build a user whose e-mail is derived from the display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        let name = name.into();
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        Self {
            id: id.into(),
            email,
            name,
            role,
        }
    }
}

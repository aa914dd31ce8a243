//! Synthetic case queue used by ingestion.

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Case, CaseId, Invoice, Priority};
use crate::util::clock::format_timestamp;

/// Lowest aiScore the generator produces.
pub const MIN_SEED_SCORE: f64 = 20.0;
/// Lowest invoice amount the generator produces.
pub const MIN_SEED_AMOUNT: f64 = 1000.0;
/// Days until a seeded invoice falls due.
pub const SEED_DUE_DAYS: i64 = 30;

/// One case of an ingestion queue, before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCase {
    /// Case identifier.
    pub id: CaseId,
    /// Business invoice number.
    pub invoice_number: String,
    /// Outstanding amount.
    pub amount: f64,
    /// Priority-influencing score.
    pub ai_score: f64,
    /// Due date (`YYYY-MM-DD`).
    pub due_date: String,
}

impl SeedCase {
    /// Priority band for this case.
    pub fn priority(&self) -> Priority {
        Priority::from_ai_score(self.ai_score)
    }

    /// Materialize the invoice and the NEW case that points at it.
    pub fn into_records(self, now: DateTime<Utc>) -> (Invoice, Case) {
        let stamp = format_timestamp(now);
        let invoice = Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_number: self.invoice_number,
            amount: self.amount,
            currency: "USD".to_string(),
            due_date: format!("{}T00:00:00.000Z", self.due_date),
            customer_id: format!("CUST-{}", self.id),
            customer_name: format!("Mock Global {}", self.id),
            region: "NA".to_string(),
            status: "OPEN".to_string(),
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        let case = Case::new(self.id, invoice.id.clone(), self.ai_score, now);
        (invoice, case)
    }
}

/// Generate `count` cases with descending score and amount.
pub fn synthetic_queue(count: usize, now: DateTime<Utc>) -> Vec<SeedCase> {
    let due_date = (now + TimeDelta::days(SEED_DUE_DAYS))
        .format("%Y-%m-%d")
        .to_string();
    let year = now.year();
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let step = i as f64;
            let index = i + 1;
            SeedCase {
                id: format!("case-{index}"),
                invoice_number: format!("INV-{year}-{index:03}"),
                amount: (50_000.0 - 1000.0 * step).max(MIN_SEED_AMOUNT),
                ai_score: (95.0 - 2.0 * step).max(MIN_SEED_SCORE),
                due_date: due_date.clone(),
            }
        })
        .collect()
}

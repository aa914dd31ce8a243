//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use case_allocator::builders::ServiceBuilder;
use case_allocator::config::EngineConfig;
use case_allocator::core::{
    AgencyRecord, AllocationService, Case, CaseStatus, CaseStore, RecordStatus, SeedCase,
};
use case_allocator::infra::{default_agencies, InMemoryCaseStore, StaticRegistry};
use case_allocator::util::clock::{format_timestamp, Clock, ManualClock};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

pub type TestService = AllocationService<InMemoryCaseStore, StaticRegistry>;

pub const ALPHA: &str = "user-agency-alpha";
pub const BETA: &str = "user-agency-beta";
pub const GAMMA: &str = "user-agency-gamma";

pub struct Harness {
    pub service: TestService,
    pub clock: Arc<ManualClock>,
    pub registry: Arc<StaticRegistry>,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

pub fn record(id: &str, name: &str, raw_score: f64, capacity: u32) -> AgencyRecord {
    AgencyRecord {
        id: id.to_string(),
        name: name.to_string(),
        score: Some(raw_score),
        capacity: Some(capacity),
        status: RecordStatus::Active,
        history: Vec::new(),
    }
}

pub fn harness_with(records: Vec<AgencyRecord>) -> Harness {
    let clock = Arc::new(ManualClock::new(start()));
    let registry = Arc::new(StaticRegistry::new(records));
    let service = ServiceBuilder::new(EngineConfig::default())
        .with_clock(clock.clone())
        .build(Arc::new(InMemoryCaseStore::new()), registry.clone())
        .unwrap();
    Harness {
        service,
        clock,
        registry,
    }
}

pub fn default_harness() -> Harness {
    harness_with(default_agencies())
}

pub fn seed(id: &str, ai_score: f64) -> SeedCase {
    SeedCase {
        id: id.to_string(),
        invoice_number: format!("INV-TEST-{id}"),
        amount: 1_000.0,
        ai_score,
        due_date: "2026-04-01".to_string(),
    }
}

/// Store a case already held by `agency_id`, assigned `hours_ago` before the clock.
pub fn place(h: &Harness, id: &str, ai_score: f64, agency_id: &str, hours_ago: i64) {
    let now = h.clock.now();
    let mut case = Case::new(id, format!("inv-{id}"), ai_score, now - TimeDelta::days(10));
    case.assign(agency_id, now - TimeDelta::hours(hours_ago));
    h.service
        .store()
        .transaction(|tx| tx.insert_case(case))
        .unwrap();
}

/// Store an unassigned NEW case.
pub fn pending(h: &Harness, id: &str, ai_score: f64) {
    let case = Case::new(id, format!("inv-{id}"), ai_score, h.clock.now());
    h.service
        .store()
        .transaction(|tx| tx.insert_case(case))
        .unwrap();
}

pub fn case(h: &Harness, id: &str) -> Case {
    h.service.case(id).unwrap()
}

pub fn active_count(h: &Harness, agency_id: &str) -> usize {
    h.service
        .store()
        .snapshot()
        .cases
        .iter()
        .filter(|c| c.is_held_by(agency_id))
        .count()
}

pub fn ids_with_status(h: &Harness, status: CaseStatus) -> Vec<String> {
    h.service
        .store()
        .snapshot()
        .cases
        .into_iter()
        .filter(|c| c.status == status)
        .map(|c| c.id)
        .collect()
}

pub fn stamp(at: DateTime<Utc>) -> String {
    format_timestamp(at)
}

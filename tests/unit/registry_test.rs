//! Tests for agency registry sources

use case_allocator::core::{AgencyRegistry, AgencyTier};
use case_allocator::infra::{default_agencies, StaticRegistry};

#[test]
fn test_default_agencies() {
    let registry = AgencyRegistry::load(&StaticRegistry::with_defaults()).unwrap();
    let ranked: Vec<&str> = registry.ranked().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(ranked, vec!["Alpha Collections", "Beta Recovery", "Gamma Partners"]);

    let gamma = registry.get("user-agency-gamma").unwrap();
    assert_eq!(gamma.status, AgencyTier::Probationary);
    assert_eq!(gamma.total_capacity, 3);
    assert_eq!(registry.probationary().len(), 1);
}

#[test]
fn test_static_registry_reflects_replacements() {
    let source = StaticRegistry::with_defaults();
    let mut records = default_agencies();
    records[2].score = Some(64.0);
    source.replace(records);

    let registry = AgencyRegistry::load(&source).unwrap();
    assert!(registry.probationary().is_empty());
}

#[test]
fn test_shipped_registry_file_matches_defaults() {
    let raw = include_str!("../../data/agencies.json");
    let records: Vec<case_allocator::core::AgencyRecord> = serde_json::from_str(raw).unwrap();
    let from_file = AgencyRegistry::from_records(records);
    let from_defaults = AgencyRegistry::from_records(default_agencies());
    assert_eq!(from_file, from_defaults);
}

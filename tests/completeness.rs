//! Integration tests for the validation run.

use ecotopo::algorithms::completeness::{validate, ReferenceSet};
use ecotopo::algorithms::names::NameTable;
use ecotopo::config::EngineConfig;
use ecotopo::model::RawFeature;
use ecotopo::Engine;
use geo::MultiPolygon;

fn named(id: &str, name: Option<&str>) -> RawFeature {
    let f = RawFeature::new(id, MultiPolygon::new(Vec::new()));
    match name {
        Some(n) => f.with_name(n),
        None => f,
    }
}

#[test]
fn beta_is_missing() {
    let reference = ReferenceSet::new(["Alpha", "Beta", "Gamma"]);
    let report = validate(["Alpha", "Gamma"], &reference);
    assert_eq!(report.missing, vec!["Beta".to_string()]);
    assert!(report.unexpected.is_empty());
    assert!(!report.is_complete());
}

#[test]
fn reference_against_itself_is_complete() {
    let reference = ReferenceSet::new(["Alpha", "Beta", "Gamma"]);
    let report = validate(reference.iter(), &reference);
    assert!(report.missing.is_empty());
    assert!(report.unexpected.is_empty());
    assert!(report.is_complete());
}

#[test]
fn engine_resolves_names_and_filters_ocean() {
    let layer = vec![
        named("_x31_", None),
        named("_x32_", Some("Gamma")),
        named("sea", Some("Ocean")),
        named("extra", Some("Delta")),
    ];
    let table = NameTable::new([("1", "Alpha")]);
    let reference = ReferenceSet::new(["Alpha", "Beta", "Gamma"]);
    let report = Engine::default().validate(&layer, &table, &reference);
    assert_eq!(report.missing, vec!["Beta".to_string()]);
    assert_eq!(report.unexpected, vec!["Delta".to_string()]);
}

#[test]
fn custom_ocean_sentinel() {
    let cfg = EngineConfig::from_json_str(r#"{"ocean_sentinel": "Open Water"}"#).unwrap();
    let engine = Engine::new(cfg).unwrap();
    let layer = vec![named("a", Some("Open  Water")), named("b", Some("Ocean"))];
    let names = engine.resolve_names(&layer, &NameTable::default());
    assert_eq!(names.discovered.iter().collect::<Vec<_>>(), vec!["Ocean"]);
    assert_eq!(names.names["a"], "Open Water");
}

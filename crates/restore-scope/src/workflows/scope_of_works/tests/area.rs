use serde_json::json;

use super::common::*;
use crate::workflows::scope_of_works::area::parse_area_text;
use crate::workflows::scope_of_works::{resolve_affected_area, AreaSource};

#[test]
fn area_text_prefers_figures_with_units() {
    assert_eq!(parse_area_text("approx 42.5 m² across 3 rooms"), Some(42.5));
    assert_eq!(parse_area_text("3 rooms, 18m2 total"), Some(18.0));
    assert_eq!(parse_area_text("1,200 sqm warehouse"), Some(1200.0));
    assert_eq!(parse_area_text("about 25 square metres"), Some(25.0));
}

#[test]
fn area_text_falls_back_to_first_number() {
    assert_eq!(parse_area_text("roughly 25"), Some(25.0));
    assert_eq!(parse_area_text("unknown"), None);
    assert_eq!(parse_area_text("0 m2"), None);
}

#[test]
fn declared_answer_beats_report_area() {
    let input = input_from(json!({
        "report": { "id": "rpt-1", "affectedArea": 30 },
        "tier3": { "T3_Q4_totalAffectedArea": "40 m2" }
    }));

    let area = resolve_affected_area(&input);
    assert_eq!(area.sqm, 40.0);
    assert_eq!(area.source, AreaSource::DeclaredAnswer);
}

#[test]
fn report_area_used_when_no_answer() {
    let area = resolve_affected_area(&minimal_input());
    assert_eq!(area.sqm, 30.0);
    assert_eq!(area.source, AreaSource::Report);
}

#[test]
fn scope_areas_are_summed_last() {
    let input = input_from(json!({
        "report": { "id": "rpt-1", "affectedArea": "n/a" },
        "scopeAreas": [
            { "name": "Kitchen", "area": 10 },
            { "name": "Hall", "length": 3, "width": 4 },
            { "name": "Unmeasured" }
        ]
    }));

    let area = resolve_affected_area(&input);
    assert_eq!(area.sqm, 22.0);
    assert_eq!(area.source, AreaSource::ScopeAreas);
}

#[test]
fn unknown_area_is_zero() {
    let input = input_from(json!({ "report": { "id": "rpt-1" } }));
    let area = resolve_affected_area(&input);
    assert!(!area.is_known());
    assert_eq!(area.source, AreaSource::Unknown);
}

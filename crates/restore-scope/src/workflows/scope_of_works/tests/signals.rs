use std::collections::BTreeSet;

use serde_json::json;

use super::common::*;
use crate::workflows::scope_of_works::signals::{
    classify, classify_chemical, classify_water_source, CategorySource,
};
use crate::workflows::scope_of_works::{
    extract_signals, AnswerBag, ChemicalTreatment, HazardTag, WaterCategory,
};

#[test]
fn classify_collects_every_matching_tag() {
    let tags = classify("Asbestos sheeting in eaves; Mould on ceiling; Biohazard in yard");
    let expected: BTreeSet<_> = [HazardTag::Asbestos, HazardTag::Mould, HazardTag::Biohazard]
        .into_iter()
        .collect();
    assert_eq!(tags, expected);
}

#[test]
fn hazard_keywords_are_case_sensitive() {
    assert!(classify("mould smell").is_empty());
    assert!(classify("Mold behind vanity").is_empty());
    assert!(classify("possible biohazard").is_empty());
    assert!(classify("Sewage in yard").is_empty());
    assert_eq!(
        classify("Biohazard tape at entry"),
        [HazardTag::Biohazard].into_iter().collect()
    );
}

#[test]
fn highest_water_category_wins() {
    assert_eq!(
        classify_water_source("Clean water supply line, now contaminated"),
        Some(WaterCategory::Category3)
    );
    assert_eq!(
        classify_water_source("Category 2 per assessor"),
        Some(WaterCategory::Category2)
    );
    assert_eq!(classify_water_source("Washing machine grey water"), None);
    assert_eq!(classify_water_source("Clean water supply line"), None);
    assert_eq!(classify_water_source("Category 1 mains water"), None);
    assert_eq!(classify_water_source("Roof leak"), None);
}

#[test]
fn descriptive_water_source_defers_to_stored_category() {
    let input = input_from(json!({
        "report": { "id": "rpt-1", "waterCategory": "Category 2" },
        "tier1": { "T1_Q3_waterSource": "Clean water supply line burst" }
    }));
    let signals = extract_signals(&input);
    assert_eq!(signals.water_category, WaterCategory::Category2);
    assert_eq!(signals.category_source, CategorySource::Report);

    let input = input_from(json!({
        "report": { "id": "rpt-1", "waterCategory": "Category 1" },
        "tier1": { "T1_Q3_waterSource": "Washing machine grey water" }
    }));
    let signals = extract_signals(&input);
    assert_eq!(signals.water_category, WaterCategory::Category1);
    assert_eq!(signals.category_source, CategorySource::Report);

    let signals = extract_signals(&burst_pipe_input());
    assert_eq!(signals.water_category, WaterCategory::Category2);
    assert_eq!(signals.category_source, CategorySource::Analysis);
}

#[test]
fn materials_match_yellow_tongue_case_sensitively() {
    let has_yellow_tongue = |materials: serde_json::Value| {
        let input = input_from(json!({
            "report": { "id": "rpt-1" },
            "tier1": { "T1_Q6_materialsAffected": materials }
        }));
        extract_signals(&input).has_yellow_tongue
    };

    assert!(has_yellow_tongue(json!(["Yellow tongue particleboard"])));
    assert!(!has_yellow_tongue(json!(["yellow tongue particleboard"])));
    assert!(!has_yellow_tongue(json!(["Carpet"])));
}

#[test]
fn water_source_answer_beats_stored_category() {
    let input = input_from(json!({
        "report": { "id": "rpt-1", "waterCategory": "Category 1" },
        "tier1": { "T1_Q3_waterSource": "Sewage backup through floor waste" }
    }));

    let signals = extract_signals(&input);
    assert_eq!(signals.water_category, WaterCategory::Category3);
    assert_eq!(signals.category_source, CategorySource::WaterSourceAnswer);
}

#[test]
fn stored_categories_fall_back_in_order() {
    let input = input_from(json!({
        "report": { "id": "rpt-1", "waterCategory": "Cat 2" },
        "analysis": { "waterCategory": "Category 3" }
    }));
    let signals = extract_signals(&input);
    assert_eq!(signals.water_category, WaterCategory::Category2);
    assert_eq!(signals.category_source, CategorySource::Report);

    let input = input_from(json!({
        "report": { "id": "rpt-1" },
        "analysis": { "waterCategory": "3" }
    }));
    assert_eq!(
        extract_signals(&input).category_source,
        CategorySource::Analysis
    );

    let signals = extract_signals(&input_from(json!({ "report": { "id": "rpt-1" } })));
    assert_eq!(signals.water_category, WaterCategory::Category1);
    assert_eq!(signals.category_source, CategorySource::Default);
}

#[test]
fn flags_follow_interview_answers() {
    let signals = extract_signals(&burst_pipe_input());

    assert!(signals.needs_plumber);
    assert!(signals.needs_electrician);
    assert!(!signals.needs_builder);
    assert!(signals.needs_class4);
    assert!(signals.has_yellow_tongue);
    assert!(signals.hazard_tags.is_empty());
    assert!(signals.hazards.is_empty(), "placeholder hazards are dropped");
    assert_eq!(signals.service_type.name, "Water Damage");
    assert_eq!(signals.service_type.standard.as_deref(), Some("S500"));
}

#[test]
fn structural_concerns_other_than_none_need_a_builder() {
    let with_concerns = |concerns: serde_json::Value| {
        let input = input_from(json!({
            "report": { "id": "rpt-1" },
            "tier2": { "T2_Q1_structuralConcerns": concerns }
        }));
        extract_signals(&input).needs_builder
    };

    assert!(!with_concerns(json!(["None identified"])));
    assert!(!with_concerns(json!([])));
    assert!(with_concerns(json!(["Sagging ceiling"])));
    assert!(with_concerns(json!(["None identified", "Cracked slab"])));
    assert!(with_concerns(json!("Swollen door frames")));
}

#[test]
fn hazards_keep_order_and_drop_placeholders() {
    let input = input_from(json!({
        "report": { "id": "rpt-1" },
        "tier1": { "T1_Q7_hazards": ["Mould", " ", "None identified", "Asbestos", 42, null] }
    }));

    let signals = extract_signals(&input);
    assert_eq!(signals.hazards, vec!["Mould", "Asbestos", "42"]);
    assert!(signals.has_mould());
    assert!(signals.has_asbestos());
    assert!(!signals.has_biohazard());
}

#[test]
fn wrong_typed_answers_are_ignored() {
    let input = input_from(json!({
        "report": { "id": "rpt-1" },
        "tier1": "not an object",
        "tier2": { "T2_Q3_buildingServicesAffected": { "electrical": true } },
        "tier3": { "T3_Q1_class4DryingAssessment": 4 }
    }));

    let signals = extract_signals(&input);
    assert!(input.tier1.is_none());
    assert!(!signals.needs_electrician);
    assert!(!signals.needs_class4);
}

#[test]
fn answer_bag_reads_lists_as_text_and_text_as_lists() {
    let bag = AnswerBag::default()
        .with("listy", json!(["Carpet", "Underlay"]))
        .with("single", json!("Carpet"));

    assert_eq!(bag.text("listy").as_deref(), Some("Carpet, Underlay"));
    assert_eq!(bag.list("single"), vec!["Carpet"]);
    assert_eq!(bag.text("missing"), None);
}

#[test]
fn chemical_text_is_classified_before_analysis() {
    assert_eq!(
        classify_chemical("Sewage decontamination"),
        Some(ChemicalTreatment::Biohazard)
    );
    assert_eq!(classify_chemical("standard clean"), None);

    let input = input_from(json!({
        "report": { "id": "rpt-1" },
        "analysis": { "chemicalTreatment": "Antimicrobial fogging" },
        "tier3": { "T3_Q3_chemicalTreatment": "mould inhibitor" }
    }));
    assert_eq!(
        extract_signals(&input).chemical_treatment,
        Some(ChemicalTreatment::Mould)
    );

    let input = input_from(json!({
        "report": { "id": "rpt-1" },
        "analysis": { "chemicalTreatment": "Antimicrobial fogging" },
        "tier3": { "T3_Q3_chemicalTreatment": "whatever is standard" }
    }));
    assert_eq!(
        extract_signals(&input).chemical_treatment,
        Some(ChemicalTreatment::Antimicrobial)
    );
}

#[test]
fn declared_service_type_keeps_its_name() {
    let input = input_from(json!({
        "report": { "id": "rpt-1" },
        "analysis": { "serviceType": "Mould remediation" }
    }));

    let service = extract_signals(&input).service_type;
    assert_eq!(service.name, "Mould remediation");
    assert_eq!(service.label(), "Mould remediation (IICRC S520)");

    let general = extract_signals(&input_from(json!({ "report": { "id": "rpt-1" } })));
    assert_eq!(general.service_type.label(), "General");
}

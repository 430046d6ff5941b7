//! Categorical facts derived from interview answers.
//!
//! All matching is plain substring membership against the keyword tables below.
//! Matching is case-sensitive unless a table says otherwise. Spelling variants
//! are not folded in: a word missing from a table does not match.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::input::ScopeInput;

pub const WATER_SOURCE: &str = "T1_Q3_waterSource";
pub const MATERIALS_AFFECTED: &str = "T1_Q6_materialsAffected";
pub const HAZARDS: &str = "T1_Q7_hazards";
pub const STRUCTURAL_CONCERNS: &str = "T2_Q1_structuralConcerns";
pub const BUILDING_SERVICES: &str = "T2_Q3_buildingServicesAffected";
pub const CLASS4_ASSESSMENT: &str = "T3_Q1_class4DryingAssessment";
pub const CHEMICAL_TREATMENT: &str = "T3_Q3_chemicalTreatment";
pub const TOTAL_AFFECTED_AREA: &str = "T3_Q4_totalAffectedArea";
pub const DRYING_PREFERENCES: &str = "T3_Q5_dryingPreferences";

/// IICRC S500 contamination category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum WaterCategory {
    #[default]
    #[serde(rename = "Category 1")]
    Category1,
    #[serde(rename = "Category 2")]
    Category2,
    #[serde(rename = "Category 3")]
    Category3,
}

impl WaterCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category1 => "Category 1",
            Self::Category2 => "Category 2",
            Self::Category3 => "Category 3",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Category1 => "Clean water",
            Self::Category2 => "Grey water",
            Self::Category3 => "Black water (grossly contaminated)",
        }
    }

    /// Parses stored values such as `"Category 2"`, `"Cat 3"` or `"2"`.
    pub fn parse_stored(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        match digits.as_str() {
            "1" => Some(Self::Category1),
            "2" => Some(Self::Category2),
            "3" => Some(Self::Category3),
            _ => None,
        }
    }
}

/// Where the resolved water category came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    WaterSourceAnswer,
    Report,
    Analysis,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardTag {
    Asbestos,
    Mould,
    Biohazard,
}

impl HazardTag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asbestos => "Asbestos",
            Self::Mould => "Mould",
            Self::Biohazard => "Biohazard",
        }
    }
}

/// Chemical treatment families with distinct per-m² rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemicalTreatment {
    Antimicrobial,
    Mould,
    Biohazard,
}

impl ChemicalTreatment {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Antimicrobial => "Antimicrobial treatment",
            Self::Mould => "Mould remediation treatment",
            Self::Biohazard => "Biohazard decontamination treatment",
        }
    }
}

/// Service line and its governing IICRC standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
}

impl ServiceType {
    pub fn general() -> Self {
        Self {
            name: "General".to_string(),
            standard: None,
        }
    }

    pub fn label(&self) -> String {
        match &self.standard {
            Some(standard) => format!("{} (IICRC {})", self.name, standard),
            None => self.name.clone(),
        }
    }
}

/// Highest category first so contamination signals always win. Category 1 is
/// never read from text; it is only the end of the fallback chain.
const CATEGORY_KEYWORDS: &[(WaterCategory, &[&str])] = &[
    (
        WaterCategory::Category3,
        &["Category 3", "contaminated", "Sewage", "biohazard"],
    ),
    (WaterCategory::Category2, &["Category 2"]),
];

const HAZARD_KEYWORDS: &[(HazardTag, &[&str])] = &[
    (HazardTag::Asbestos, &["Asbestos"]),
    (HazardTag::Mould, &["Mould"]),
    (HazardTag::Biohazard, &["Biohazard"]),
];

const CHEMICAL_KEYWORDS: &[(ChemicalTreatment, &[&str])] = &[
    (ChemicalTreatment::Mould, &["Mould", "mould", "Mold", "mold"]),
    (
        ChemicalTreatment::Biohazard,
        &["Biohazard", "biohazard", "Sewage", "sewage"],
    ),
    (
        ChemicalTreatment::Antimicrobial,
        &["Antimicrobial", "antimicrobial"],
    ),
];

/// Matched against lowercased text, first hit wins.
const SERVICE_KEYWORDS: &[(&str, &str, &str)] = &[
    ("water", "Water Damage", "S500"),
    ("mould", "Mould Remediation", "S520"),
    ("mold", "Mould Remediation", "S520"),
    ("fire", "Fire & Smoke", "S700"),
    ("smoke", "Fire & Smoke", "S700"),
    ("bio", "Biohazard", "S540"),
    ("crime", "Crime Scene", "S540"),
];

const YELLOW_TONGUE_KEYWORDS: &[&str] = &["Yellow tongue"];
const CLASS4_KEYWORDS: &[&str] = &["Class 4", "Class 3 or 4"];
const ELECTRICAL_KEYWORDS: &[&str] = &["Electrical"];
const PLUMBING_KEYWORDS: &[&str] = &["pipe", "toilet"];
const NO_STRUCTURAL_CONCERNS: &str = "None identified";
const NON_HAZARD_ENTRIES: &[&str] = &["None", "None identified"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Hazard tags mentioned anywhere in `text`.
pub fn classify(text: &str) -> BTreeSet<HazardTag> {
    HAZARD_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(text, keywords))
        .map(|(tag, _)| *tag)
        .collect()
}

/// Explicit IICRC category phrase in a water-source description.
pub fn classify_water_source(text: &str) -> Option<WaterCategory> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(text, keywords))
        .map(|(category, _)| *category)
}

pub fn classify_chemical(text: &str) -> Option<ChemicalTreatment> {
    CHEMICAL_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(text, keywords))
        .map(|(treatment, _)| *treatment)
}

pub fn classify_service(text: &str) -> Option<ServiceType> {
    let lowered = text.to_lowercase();
    SERVICE_KEYWORDS
        .iter()
        .find(|(keyword, _, _)| lowered.contains(keyword))
        .map(|(_, name, standard)| ServiceType {
            name: (*name).to_string(),
            standard: Some((*standard).to_string()),
        })
}

/// Everything downstream needs to know about the job, decided once.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSignals {
    pub water_category: WaterCategory,
    pub category_source: CategorySource,
    pub hazard_tags: BTreeSet<HazardTag>,
    /// Reported hazards with placeholder answers removed, in capture order.
    pub hazards: Vec<String>,
    pub has_yellow_tongue: bool,
    pub needs_class4: bool,
    pub needs_builder: bool,
    pub needs_electrician: bool,
    pub needs_plumber: bool,
    /// Explicitly requested treatment, if the answers name one.
    pub chemical_treatment: Option<ChemicalTreatment>,
    pub service_type: ServiceType,
}

impl ScopeSignals {
    pub fn has(&self, tag: HazardTag) -> bool {
        self.hazard_tags.contains(&tag)
    }

    pub fn has_asbestos(&self) -> bool {
        self.has(HazardTag::Asbestos)
    }

    pub fn has_mould(&self) -> bool {
        self.has(HazardTag::Mould)
    }

    pub fn has_biohazard(&self) -> bool {
        self.has(HazardTag::Biohazard)
    }
}

type CategoryResolver = fn(&ScopeInput) -> Option<WaterCategory>;

const CATEGORY_CHAIN: &[(CategorySource, CategoryResolver)] = &[
    (CategorySource::WaterSourceAnswer, category_from_answer),
    (CategorySource::Report, category_from_report),
    (CategorySource::Analysis, category_from_analysis),
];

fn category_from_answer(input: &ScopeInput) -> Option<WaterCategory> {
    input
        .tier1()
        .text(WATER_SOURCE)
        .and_then(|text| classify_water_source(&text))
}

fn category_from_report(input: &ScopeInput) -> Option<WaterCategory> {
    input
        .report
        .water_category
        .as_deref()
        .and_then(WaterCategory::parse_stored)
}

fn category_from_analysis(input: &ScopeInput) -> Option<WaterCategory> {
    input
        .analysis
        .as_ref()
        .and_then(|analysis| analysis.water_category.as_deref())
        .and_then(WaterCategory::parse_stored)
}

fn resolve_category(input: &ScopeInput) -> (WaterCategory, CategorySource) {
    CATEGORY_CHAIN
        .iter()
        .find_map(|(source, resolve)| resolve(input).map(|category| (category, *source)))
        .unwrap_or((WaterCategory::Category1, CategorySource::Default))
}

fn structural_concerns_present(concerns: &[String]) -> bool {
    match concerns {
        [] => false,
        [only] => only != NO_STRUCTURAL_CONCERNS,
        _ => true,
    }
}

fn resolve_service_type(
    input: &ScopeInput,
    water_source: Option<&str>,
    hazards: &[String],
) -> ServiceType {
    if let Some(declared) = input
        .analysis
        .as_ref()
        .and_then(|analysis| analysis.service_type.as_deref())
    {
        let standard = classify_service(declared).and_then(|matched| matched.standard);
        return ServiceType {
            name: declared.to_string(),
            standard,
        };
    }

    let mut text = water_source.unwrap_or_default().to_string();
    for hazard in hazards {
        text.push(' ');
        text.push_str(hazard);
    }

    classify_service(&text).unwrap_or_else(ServiceType::general)
}

pub fn extract_signals(input: &ScopeInput) -> ScopeSignals {
    let tier1 = input.tier1();
    let tier2 = input.tier2();
    let tier3 = input.tier3();

    let (water_category, category_source) = resolve_category(input);
    let water_source = tier1.text(WATER_SOURCE);

    let reported = tier1.list(HAZARDS);
    let hazard_tags = reported
        .iter()
        .flat_map(|entry| classify(entry))
        .collect::<BTreeSet<_>>();
    let hazards: Vec<String> = reported
        .into_iter()
        .filter(|entry| !NON_HAZARD_ENTRIES.contains(&entry.as_str()))
        .collect();

    let has_yellow_tongue = tier1
        .list(MATERIALS_AFFECTED)
        .iter()
        .any(|material| contains_any(material, YELLOW_TONGUE_KEYWORDS));

    let needs_class4 = tier3
        .text(CLASS4_ASSESSMENT)
        .is_some_and(|text| contains_any(&text, CLASS4_KEYWORDS));

    let needs_builder = structural_concerns_present(&tier2.list(STRUCTURAL_CONCERNS));
    let needs_electrician = tier2
        .list(BUILDING_SERVICES)
        .iter()
        .any(|service| contains_any(service, ELECTRICAL_KEYWORDS));
    let needs_plumber = water_source
        .as_deref()
        .is_some_and(|text| contains_any(text, PLUMBING_KEYWORDS));

    let chemical_treatment = tier3
        .text(CHEMICAL_TREATMENT)
        .and_then(|text| classify_chemical(&text))
        .or_else(|| {
            input
                .analysis
                .as_ref()
                .and_then(|analysis| analysis.chemical_treatment.as_deref())
                .and_then(classify_chemical)
        });

    let service_type = resolve_service_type(input, water_source.as_deref(), &hazards);

    debug!(
        category = water_category.label(),
        ?category_source,
        hazards = hazard_tags.len(),
        needs_class4,
        has_yellow_tongue,
        "signals extracted"
    );

    ScopeSignals {
        water_category,
        category_source,
        hazard_tags,
        hazards,
        has_yellow_tongue,
        needs_class4,
        needs_builder,
        needs_electrician,
        needs_plumber,
        chemical_treatment,
        service_type,
    }
}

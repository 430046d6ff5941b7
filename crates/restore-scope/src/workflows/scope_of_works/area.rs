use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::input::ScopeInput;
use super::rates::parse_numeric_text;
use super::signals::TOTAL_AFFECTED_AREA;

/// Disagreements smaller than this are measurement rounding, not a conflict.
const AREA_CONFLICT_TOLERANCE_SQM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSource {
    DeclaredAnswer,
    Report,
    ScopeAreas,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AffectedArea {
    pub sqm: f64,
    pub source: AreaSource,
}

impl AffectedArea {
    pub fn is_known(&self) -> bool {
        self.sqm > 0.0
    }
}

type AreaResolver = fn(&ScopeInput) -> Option<f64>;

const AREA_CHAIN: &[(AreaSource, AreaResolver)] = &[
    (AreaSource::DeclaredAnswer, area_from_answer),
    (AreaSource::Report, area_from_report),
    (AreaSource::ScopeAreas, area_from_scope_areas),
];

fn area_with_unit() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:m²|m2|sqm|sq\.?\s*m|square\s*met)")
            .expect("valid area regex")
    })
}

fn bare_number() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid number regex"))
}

/// Area in m² from a free-text answer such as `"approx 42.5 m² across 3 rooms"`.
/// A figure with a unit beats the first bare number.
pub fn parse_area_text(text: &str) -> Option<f64> {
    let figure = area_with_unit()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .or_else(|| bare_number().find(text))?;

    parse_numeric_text(figure.as_str()).filter(|area| *area > 0.0)
}

fn area_from_answer(input: &ScopeInput) -> Option<f64> {
    input
        .tier3()
        .text(TOTAL_AFFECTED_AREA)
        .and_then(|text| parse_area_text(&text))
}

fn area_from_report(input: &ScopeInput) -> Option<f64> {
    input.report.affected_area.filter(|area| *area > 0.0)
}

fn area_from_scope_areas(input: &ScopeInput) -> Option<f64> {
    let total: f64 = input.scope_areas.iter().filter_map(|area| area.area_sqm()).sum();
    (total > 0.0).then_some(total)
}

/// First positive area in chain order; 0 when nothing is known.
pub fn resolve_affected_area(input: &ScopeInput) -> AffectedArea {
    if let (Some(declared), Some(recorded)) = (area_from_answer(input), area_from_report(input)) {
        if (declared - recorded).abs() > AREA_CONFLICT_TOLERANCE_SQM {
            warn!(
                report_id = %input.report.id,
                declared,
                recorded,
                "declared affected area disagrees with report; using declared answer"
            );
        }
    }

    AREA_CHAIN
        .iter()
        .find_map(|(source, resolve)| {
            resolve(input).map(|sqm| AffectedArea {
                sqm,
                source: *source,
            })
        })
        .unwrap_or(AffectedArea {
            sqm: 0.0,
            source: AreaSource::Unknown,
        })
}

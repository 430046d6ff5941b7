//! Inbound payload for a scope generation run.
//!
//! Interview answers, report fields and auxiliary readings arrive from forms and
//! LLM extraction. A wrong type or a missing value degrades to `None`/empty
//! instead of rejecting the request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::equipment::EquipmentSelection;
use super::rates::{coerce_number, PricingConfig};

/// Complete input for one scope-of-works generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeInput {
    #[serde(deserialize_with = "lenient_record")]
    pub report: ReportRecord,
    #[serde(deserialize_with = "lenient_object")]
    pub analysis: Option<AnalysisRecord>,
    #[serde(deserialize_with = "lenient_bag")]
    pub tier1: Option<AnswerBag>,
    #[serde(deserialize_with = "lenient_bag")]
    pub tier2: Option<AnswerBag>,
    #[serde(deserialize_with = "lenient_bag")]
    pub tier3: Option<AnswerBag>,
    #[serde(deserialize_with = "lenient_pricing")]
    pub pricing_config: Option<PricingConfig>,
    #[serde(deserialize_with = "lenient_object")]
    pub state_info: Option<StateInfo>,
    #[serde(deserialize_with = "lenient_list")]
    pub equipment_selection: Vec<EquipmentSelection>,
    #[serde(deserialize_with = "lenient_object")]
    pub psychrometric_assessment: Option<PsychrometricAssessment>,
    #[serde(deserialize_with = "lenient_list")]
    pub scope_areas: Vec<ScopeArea>,
}

impl ScopeInput {
    pub(crate) fn tier1(&self) -> &AnswerBag {
        self.tier1.as_ref().unwrap_or(AnswerBag::empty())
    }

    pub(crate) fn tier2(&self) -> &AnswerBag {
        self.tier2.as_ref().unwrap_or(AnswerBag::empty())
    }

    pub(crate) fn tier3(&self) -> &AnswerBag {
        self.tier3.as_ref().unwrap_or(AnswerBag::empty())
    }
}

/// Stored report fields the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub claim_reference_number: Option<String>,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub water_category: Option<String>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub affected_area: Option<f64>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub drying_duration: Option<f64>,
    #[serde(
        deserialize_with = "lenient_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<u32>,
}

/// Fields lifted from the AI analysis of an uploaded report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRecord {
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub water_category: Option<String>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub drying_duration: Option<f64>,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub chemical_treatment: Option<String>,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_type: Option<String>,
}

/// Jurisdiction details echoed into the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateInfo {
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub state_name: Option<String>,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub building_authority: Option<String>,
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_safety_authority: Option<String>,
}

impl StateInfo {
    pub fn display_name(&self) -> Option<String> {
        match (&self.state_name, &self.state) {
            (Some(name), Some(code)) => Some(format!("{name} ({code})")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(code)) => Some(code.clone()),
            (None, None) => None,
        }
    }
}

/// Psychrometric readings captured on site. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PsychrometricAssessment {
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub water_class: Option<String>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<f64>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub humidity: Option<f64>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub dew_point: Option<f64>,
}

/// A measured room or zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeArea {
    #[serde(
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<f64>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<f64>,
}

impl ScopeArea {
    /// Explicit area wins over length × width.
    pub fn area_sqm(&self) -> Option<f64> {
        if let Some(area) = self.area.filter(|area| *area > 0.0) {
            return Some(area);
        }

        match (self.length, self.width) {
            (Some(length), Some(width)) if length > 0.0 && width > 0.0 => Some(length * width),
            _ => None,
        }
    }
}

/// Interview answers keyed by question id (`T1_Q3_waterSource`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerBag(Map<String, Value>);

impl AnswerBag {
    pub fn new(answers: Map<String, Value>) -> Self {
        Self(answers)
    }

    pub(crate) fn empty() -> &'static AnswerBag {
        static EMPTY: std::sync::OnceLock<AnswerBag> = std::sync::OnceLock::new();
        EMPTY.get_or_init(AnswerBag::default)
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Free-text answer. Lists are joined with `", "`.
    pub fn text(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::String(value) => value.trim().to_string(),
            Value::Number(value) => value.to_string(),
            Value::Array(values) => values
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
            _ => return None,
        };

        (!text.is_empty()).then_some(text)
    }

    /// Multi-select answer. A lone string counts as a single entry.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(values)) => values.iter().filter_map(scalar_text).collect(),
            Some(Value::String(value)) if !value.trim().is_empty() => {
                vec![value.trim().to_string()]
            }
            _ => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

fn lenient_version<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = lenient_number(deserializer)?;
    Ok(number
        .filter(|version| *version >= 1.0 && *version <= u32::MAX as f64)
        .map(|version| version.trunc() as u32))
}

fn lenient_bag<'de, D>(deserializer: D) -> Result<Option<AnswerBag>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(answers) => Ok(Some(AnswerBag(answers))),
        Value::Null => Ok(None),
        other => {
            debug!(kind = value_kind(&other), "ignoring non-object tier answers");
            Ok(None)
        }
    }
}

fn lenient_pricing<'de, D>(deserializer: D) -> Result<Option<PricingConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(PricingConfig::from_value(value))
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

fn lenient_record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient_object(deserializer).map(Option::unwrap_or_default)
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!(error = %err, "skipping malformed list entry");
                None
            }
        })
        .collect())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::domain::ScopeError;

/// Every rate the engine prices against, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateKey {
    MasterQualifiedNormalHours,
    QualifiedTechnicianNormalHours,
    LabourerNormalHours,
    AirMoverAxialDailyRate,
    AirMoverCentrifugalDailyRate,
    DehumidifierLgrDailyRate,
    DehumidifierDesiccantDailyRate,
    AfdUnitLargeDailyRate,
    HeatDryingUnitDailyRate,
    InjectionDryingSystemDailyRate,
    ExtractionTruckMountedHourlyRate,
    ExtractionElectricHourlyRate,
    ThermalCameraUsePerAssessment,
    MinimumCallOutCharge,
    AdministrationFee,
    AntimicrobialTreatmentRate,
    MouldRemediationTreatmentRate,
    BiohazardTreatmentRate,
}

pub const RATE_KEY_COUNT: usize = 18;

impl RateKey {
    pub const fn ordered() -> [Self; RATE_KEY_COUNT] {
        [
            Self::MasterQualifiedNormalHours,
            Self::QualifiedTechnicianNormalHours,
            Self::LabourerNormalHours,
            Self::AirMoverAxialDailyRate,
            Self::AirMoverCentrifugalDailyRate,
            Self::DehumidifierLgrDailyRate,
            Self::DehumidifierDesiccantDailyRate,
            Self::AfdUnitLargeDailyRate,
            Self::HeatDryingUnitDailyRate,
            Self::InjectionDryingSystemDailyRate,
            Self::ExtractionTruckMountedHourlyRate,
            Self::ExtractionElectricHourlyRate,
            Self::ThermalCameraUsePerAssessment,
            Self::MinimumCallOutCharge,
            Self::AdministrationFee,
            Self::AntimicrobialTreatmentRate,
            Self::MouldRemediationTreatmentRate,
            Self::BiohazardTreatmentRate,
        ]
    }

    /// Field name in the stored pricing configuration.
    pub const fn field(self) -> &'static str {
        match self {
            Self::MasterQualifiedNormalHours => "masterQualifiedNormalHours",
            Self::QualifiedTechnicianNormalHours => "qualifiedTechnicianNormalHours",
            Self::LabourerNormalHours => "labourerNormalHours",
            Self::AirMoverAxialDailyRate => "airMoverAxialDailyRate",
            Self::AirMoverCentrifugalDailyRate => "airMoverCentrifugalDailyRate",
            Self::DehumidifierLgrDailyRate => "dehumidifierLGRDailyRate",
            Self::DehumidifierDesiccantDailyRate => "dehumidifierDesiccantDailyRate",
            Self::AfdUnitLargeDailyRate => "afdUnitLargeDailyRate",
            Self::HeatDryingUnitDailyRate => "heatDryingUnitDailyRate",
            Self::InjectionDryingSystemDailyRate => "injectionDryingSystemDailyRate",
            Self::ExtractionTruckMountedHourlyRate => "extractionTruckMountedHourlyRate",
            Self::ExtractionElectricHourlyRate => "extractionElectricHourlyRate",
            Self::ThermalCameraUsePerAssessment => "thermalCameraUsePerAssessment",
            Self::MinimumCallOutCharge => "minimumCallOutCharge",
            Self::AdministrationFee => "administrationFee",
            Self::AntimicrobialTreatmentRate => "antimicrobialTreatmentRate",
            Self::MouldRemediationTreatmentRate => "mouldRemediationTreatmentRate",
            Self::BiohazardTreatmentRate => "biohazardTreatmentRate",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Company pricing record exactly as stored; values may be numbers, strings or junk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingConfig(Map<String, Value>);

impl PricingConfig {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Only a JSON object counts as a configuration; anything else is treated as absent.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Every known key set to the same value.
    pub fn uniform(rate: f64) -> Self {
        let fields = RateKey::ordered()
            .into_iter()
            .map(|key| (key.field().to_string(), Value::from(rate)))
            .collect();
        Self(fields)
    }

    pub fn with(mut self, key: RateKey, value: Value) -> Self {
        self.0.insert(key.field().to_string(), value);
        self
    }

    pub fn raw(&self, key: RateKey) -> Option<&Value> {
        self.0.get(key.field())
    }
}

/// Resolved, purely numeric rates. Every entry is finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: [f64; RATE_KEY_COUNT],
}

impl RateTable {
    pub fn get(&self, key: RateKey) -> f64 {
        self.rates[key.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = (RateKey, f64)> + '_ {
        RateKey::ordered()
            .into_iter()
            .map(move |key| (key, self.get(key)))
    }
}

/// Resolve a raw pricing record into a [`RateTable`].
///
/// A missing configuration is fatal: a zero-rate estimate would be materially
/// misleading. Individual bad fields are not; they resolve to 0.
pub fn resolve_rates(config: Option<&PricingConfig>) -> Result<RateTable, ScopeError> {
    let config = config.ok_or(ScopeError::MissingPricingConfig)?;
    let mut rates = [0.0; RATE_KEY_COUNT];

    for key in RateKey::ordered() {
        rates[key.index()] = resolve_rate(config, key);
    }

    Ok(RateTable { rates })
}

fn resolve_rate(config: &PricingConfig, key: RateKey) -> f64 {
    let Some(raw) = config.raw(key) else {
        debug!(field = key.field(), "rate missing, defaulting to 0");
        return 0.0;
    };

    match coerce_number(raw) {
        Some(rate) if rate >= 0.0 => rate,
        Some(rate) => {
            debug!(field = key.field(), rate, "negative rate clamped to 0");
            0.0
        }
        None => {
            debug!(field = key.field(), raw = %raw, "unparseable rate, defaulting to 0");
            0.0
        }
    }
}

/// Finite number from a JSON number or numeric string.
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_numeric_text(text),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

fn leading_number() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
    })
}

/// Longest leading numeric prefix, ignoring currency symbols and thousands separators
/// (`"$1,250.50/day"` → 1250.5).
pub(crate) fn parse_numeric_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',') && !ch.is_whitespace())
        .collect();

    leading_number()
        .find(&cleaned)
        .and_then(|found| found.as_str().parse::<f64>().ok())
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::input::{PsychrometricAssessment, StateInfo};
use super::line_items::LineItem;
use super::signals::{ServiceType, WaterCategory};
use super::trades::LicensedTrade;

/// Failures that stop a generation run outright.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("pricing configuration missing: configure your pricing before generating a scope of works")]
    MissingPricingConfig,
    #[error("line item {id} subtotal drifted from its breakdown (stored {stored:.2}, recomputed {recomputed:.2})")]
    SubtotalDrift {
        id: String,
        stored: f64,
        recomputed: f64,
    },
    #[error("drying schedule of {days} days from {start} falls outside the supported calendar")]
    ScheduleOutOfRange { start: NaiveDate, days: u32 },
}

/// Structured scope of works: persisted verbatim and rendered by the document compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeOfWorksData {
    pub report_id: String,
    pub claim_reference: String,
    pub date: NaiveDate,
    pub version: u32,
    pub service_type: ServiceType,
    pub line_items: Vec<LineItem>,
    pub licensed_trades: Vec<LicensedTrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_info: Option<StateInfo>,
    pub water_category: WaterCategory,
    pub drying_duration: u32,
    pub affected_area_sqm: f64,
    pub has_class4_drying: bool,
    pub hazards: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psychrometric_assessment: Option<PsychrometricAssessment>,
}

impl ScopeOfWorksData {
    pub fn line_item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id == id)
    }

    pub fn total(&self) -> f64 {
        self.line_items.iter().map(|item| item.subtotal).sum()
    }
}

//! Scope-of-works cost estimation for water damage restoration claims.
//!
//! A generation run is a pure pipeline over one [`ScopeInput`]: rates are
//! resolved, signals extracted from the interview answers, area and drying
//! duration settled, equipment aggregated, line items and licensed trades
//! derived, and finally the whole thing compiled into a markdown document.

pub mod area;
pub mod document;
pub mod domain;
pub mod duration;
pub mod equipment;
pub mod input;
pub mod line_items;
pub mod rates;
pub mod repository;
pub mod router;
pub mod service;
pub mod signals;
pub mod trades;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ScopeConfig;

pub use area::{resolve_affected_area, AffectedArea, AreaSource};
pub use document::compile_document;
pub use domain::{ScopeError, ScopeOfWorksData};
pub use duration::{estimate_duration, DryingDuration, DurationContext, DurationSource};
pub use equipment::{
    aggregate_equipment, EquipmentBucket, EquipmentClass, EquipmentGroup, EquipmentSelection,
    EquipmentSummary,
};
pub use input::{
    AnalysisRecord, AnswerBag, PsychrometricAssessment, ReportRecord, ScopeArea, ScopeInput,
    StateInfo,
};
pub use line_items::{
    generate_line_items, EquipmentLine, LabourLine, LabourTier, LineItem, LineItemContext,
};
pub use rates::{resolve_rates, PricingConfig, RateKey, RateTable};
pub use repository::{RepositoryError, ScopeRecord, ScopeRepository};
pub use router::scope_router;
pub use service::{ScopeOfWorksService, ScopeServiceError};
pub use signals::{
    extract_signals, ChemicalTreatment, HazardTag, ScopeSignals, ServiceType, WaterCategory,
};
pub use trades::{detect_trades, LicensedTrade, TradeKind};

const UNKNOWN_CLAIM_REFERENCE: &str = "Not provided";

/// Structured result plus its rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeOfWorks {
    pub data: ScopeOfWorksData,
    pub document: String,
}

/// Stateless engine; one instance can serve any number of runs.
#[derive(Debug, Clone, Default)]
pub struct ScopeOfWorksEngine {
    config: ScopeConfig,
}

impl ScopeOfWorksEngine {
    pub fn new(config: ScopeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Generate a scope of works dated `date`. Identical inputs and date yield
    /// identical output.
    pub fn generate(
        &self,
        input: &ScopeInput,
        date: NaiveDate,
    ) -> Result<ScopeOfWorks, ScopeError> {
        let rates = resolve_rates(input.pricing_config.as_ref())?;
        let signals = extract_signals(input);
        let area = resolve_affected_area(input);
        let duration = estimate_duration(&DurationContext {
            input,
            needs_class4: signals.needs_class4,
            affected_area_sqm: area.sqm,
        });
        debug!(
            report_id = %input.report.id,
            area_sqm = area.sqm,
            area_source = ?area.source,
            days = duration.days,
            duration_source = ?duration.source,
            "job extent resolved"
        );

        let equipment = aggregate_equipment(&input.equipment_selection, &rates, duration.days);
        let line_items = generate_line_items(&LineItemContext {
            rates: &rates,
            signals: &signals,
            equipment: &equipment,
            duration,
            affected_area_sqm: area.sqm,
        });
        let licensed_trades = detect_trades(&signals);

        let data = ScopeOfWorksData {
            report_id: input.report.id.clone(),
            claim_reference: input
                .report
                .claim_reference_number
                .clone()
                .unwrap_or_else(|| UNKNOWN_CLAIM_REFERENCE.to_string()),
            date,
            version: input.report.version.unwrap_or(self.config.default_version),
            service_type: signals.service_type.clone(),
            line_items,
            licensed_trades,
            state_info: input.state_info.clone(),
            water_category: signals.water_category,
            drying_duration: duration.days,
            affected_area_sqm: area.sqm,
            has_class4_drying: signals.needs_class4 && signals.has_yellow_tongue,
            hazards: signals.hazards.clone(),
            psychrometric_assessment: input.psychrometric_assessment.clone(),
        };

        let document = compile_document(&data)?;

        info!(
            report_id = %data.report_id,
            version = data.version,
            line_items = data.line_items.len(),
            licensed_trades = data.licensed_trades.len(),
            total = data.total(),
            "scope of works generated"
        );

        Ok(ScopeOfWorks { data, document })
    }
}

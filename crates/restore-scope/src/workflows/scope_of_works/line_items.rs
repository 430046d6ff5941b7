use serde::{Deserialize, Serialize};

use super::duration::{DryingDuration, LARGE_AREA_THRESHOLD_SQM};
use super::equipment::EquipmentSummary;
use super::rates::{RateKey, RateTable};
use super::signals::{ChemicalTreatment, ScopeSignals};

const EXTRACTION_DEFAULT_HOURS: f64 = 4.0;
const EXTRACTION_MIN_HOURS: f64 = 2.0;
const EXTRACTION_MAX_HOURS: f64 = 8.0;
const EXTRACTION_SQM_PER_HOUR: f64 = 25.0;
const HANDLING_BASE_HOURS: f64 = 1.0;
const HANDLING_HOURS_PER_UNIT: f64 = 0.25;
const CLASS4_MASTER_HOURS: f64 = 12.0;
const CLASS4_QUALIFIED_HOURS: f64 = 8.0;
const CERTIFICATION_HOURS: f64 = 2.0;

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabourTier {
    MasterQualified,
    QualifiedTechnician,
    Labourer,
}

impl LabourTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MasterQualified => "Master Qualified Technician",
            Self::QualifiedTechnician => "Qualified Technician",
            Self::Labourer => "Labourer",
        }
    }

    pub const fn rate_key(self) -> RateKey {
        match self {
            Self::MasterQualified => RateKey::MasterQualifiedNormalHours,
            Self::QualifiedTechnician => RateKey::QualifiedTechnicianNormalHours,
            Self::Labourer => RateKey::LabourerNormalHours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabourLine {
    pub tier: LabourTier,
    pub hours: f64,
    pub rate: f64,
}

impl LabourLine {
    fn priced(tier: LabourTier, hours: f64, rates: &RateTable) -> Self {
        Self {
            tier,
            hours,
            rate: rates.get(tier.rate_key()),
        }
    }

    pub fn cost(&self) -> f64 {
        round_cents(self.hours * self.rate)
    }
}

/// `units × periods × rate`, e.g. 3 air movers × 7 days × $45.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentLine {
    pub description: String,
    pub units: f64,
    pub periods: f64,
    pub period_unit: String,
    pub rate: f64,
}

impl EquipmentLine {
    fn new(description: &str, units: f64, periods: f64, period_unit: &str, rate: f64) -> Self {
        Self {
            description: description.to_string(),
            units,
            periods,
            period_unit: period_unit.to_string(),
            rate,
        }
    }

    pub fn cost(&self) -> f64 {
        round_cents(self.units * self.periods * self.rate)
    }
}

/// A priced row of the scope. `subtotal` is only ever set from the item's own
/// `rate`/`labour`/`equipment`, so [`LineItem::recompute_subtotal`] must agree with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub description: String,
    pub qty: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labour: Vec<LabourLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<EquipmentLine>,
    pub subtotal: f64,
}

impl LineItem {
    fn flat(id: String, description: &str, qty: f64, unit: &str, rate: f64) -> Self {
        let mut item = Self {
            id,
            description: description.to_string(),
            qty,
            unit: unit.to_string(),
            rate: Some(rate),
            labour: Vec::new(),
            equipment: Vec::new(),
            subtotal: 0.0,
        };
        item.subtotal = item.recompute_subtotal();
        item
    }

    /// Itemised work is always one lot; the hours and unit-days live in the breakdown.
    fn itemised(
        id: String,
        description: &str,
        labour: Vec<LabourLine>,
        equipment: Vec<EquipmentLine>,
    ) -> Self {
        let mut item = Self {
            id,
            description: description.to_string(),
            qty: 1.0,
            unit: "lot".to_string(),
            rate: None,
            labour,
            equipment,
            subtotal: 0.0,
        };
        item.subtotal = item.recompute_subtotal();
        item
    }

    pub fn labour_cost(&self) -> f64 {
        round_cents(self.labour.iter().map(LabourLine::cost).sum())
    }

    pub fn equipment_cost(&self) -> f64 {
        round_cents(self.equipment.iter().map(EquipmentLine::cost).sum())
    }

    pub fn recompute_subtotal(&self) -> f64 {
        match self.rate {
            Some(rate) => round_cents(rate * self.qty),
            None => round_cents(self.labour_cost() + self.equipment_cost()),
        }
    }

    /// Price per `unit`. Itemised items are a single lot, so this is their subtotal.
    pub fn effective_rate(&self) -> f64 {
        self.rate.unwrap_or_else(|| self.recompute_subtotal())
    }
}

/// Hands out `RW_n` ids in push order.
#[derive(Debug, Default)]
struct LineItemSequence {
    items: Vec<LineItem>,
}

impl LineItemSequence {
    fn next_id(&self) -> String {
        format!("RW_{}", self.items.len() + 1)
    }

    fn flat(&mut self, description: &str, qty: f64, unit: &str, rate: f64) {
        let item = LineItem::flat(self.next_id(), description, qty, unit, rate);
        self.items.push(item);
    }

    fn itemised(
        &mut self,
        description: &str,
        labour: Vec<LabourLine>,
        equipment: Vec<EquipmentLine>,
    ) {
        let item = LineItem::itemised(self.next_id(), description, labour, equipment);
        self.items.push(item);
    }
}

/// Resolved facts the generator prices.
#[derive(Debug, Clone, Copy)]
pub struct LineItemContext<'a> {
    pub rates: &'a RateTable,
    pub signals: &'a ScopeSignals,
    pub equipment: &'a EquipmentSummary,
    pub duration: DryingDuration,
    pub affected_area_sqm: f64,
}

impl LineItemContext<'_> {
    fn days(&self) -> f64 {
        f64::from(self.duration.days)
    }

    fn area_known(&self) -> bool {
        self.affected_area_sqm > 0.0
    }
}

pub fn extraction_hours(affected_area_sqm: f64) -> f64 {
    if affected_area_sqm > 0.0 {
        (affected_area_sqm / EXTRACTION_SQM_PER_HOUR)
            .ceil()
            .clamp(EXTRACTION_MIN_HOURS, EXTRACTION_MAX_HOURS)
    } else {
        EXTRACTION_DEFAULT_HOURS
    }
}

pub fn assessment_count(days: u32) -> u32 {
    if days >= 7 {
        3
    } else if days >= 4 {
        2
    } else {
        1
    }
}

/// Explicit treatment from the answers, then hazard flags, then antimicrobial.
pub fn select_chemical_treatment(signals: &ScopeSignals) -> ChemicalTreatment {
    if let Some(explicit) = signals.chemical_treatment {
        explicit
    } else if signals.has_mould() {
        ChemicalTreatment::Mould
    } else if signals.has_biohazard() {
        ChemicalTreatment::Biohazard
    } else {
        ChemicalTreatment::Antimicrobial
    }
}

const fn chemical_rate_key(treatment: ChemicalTreatment) -> RateKey {
    match treatment {
        ChemicalTreatment::Antimicrobial => RateKey::AntimicrobialTreatmentRate,
        ChemicalTreatment::Mould => RateKey::MouldRemediationTreatmentRate,
        ChemicalTreatment::Biohazard => RateKey::BiohazardTreatmentRate,
    }
}

fn handling_hours(units: f64) -> f64 {
    HANDLING_BASE_HOURS + HANDLING_HOURS_PER_UNIT * units
}

fn deployed_equipment_lines(equipment: &EquipmentSummary) -> Vec<EquipmentLine> {
    let mut lines = Vec::new();
    for bucket in &equipment.buckets {
        let days = f64::from(bucket.days);
        if bucket.has_uniform_rate() {
            lines.push(EquipmentLine::new(
                bucket.class.label(),
                bucket.qty,
                days,
                "day",
                bucket.daily_rate,
            ));
        } else {
            for item in &bucket.items {
                lines.push(EquipmentLine::new(
                    &format!("{} ({})", bucket.class.label(), item.group_id),
                    item.quantity,
                    days,
                    "day",
                    item.daily_rate,
                ));
            }
        }
    }
    lines
}

pub fn generate_line_items(ctx: &LineItemContext<'_>) -> Vec<LineItem> {
    let rates = ctx.rates;
    let signals = ctx.signals;
    let mut sequence = LineItemSequence::default();

    sequence.flat(
        "Emergency call-out, site inspection and make safe",
        1.0,
        "call-out",
        rates.get(RateKey::MinimumCallOutCharge),
    );

    let hours = extraction_hours(ctx.affected_area_sqm);
    let (extraction_unit, extraction_rate) = if ctx.affected_area_sqm > LARGE_AREA_THRESHOLD_SQM {
        (
            "Truck-mounted extraction unit",
            RateKey::ExtractionTruckMountedHourlyRate,
        )
    } else {
        (
            "Portable electric extraction unit",
            RateKey::ExtractionElectricHourlyRate,
        )
    };
    sequence.itemised(
        "Water extraction from affected areas",
        vec![LabourLine::priced(
            LabourTier::QualifiedTechnician,
            hours,
            rates,
        )],
        vec![EquipmentLine::new(
            extraction_unit,
            1.0,
            hours,
            "hour",
            rates.get(extraction_rate),
        )],
    );

    sequence.itemised(
        "Drying equipment deployment and setup",
        vec![LabourLine::priced(
            LabourTier::QualifiedTechnician,
            handling_hours(ctx.equipment.total_units()),
            rates,
        )],
        deployed_equipment_lines(ctx.equipment),
    );

    let assessments = f64::from(assessment_count(ctx.duration.days));
    sequence.itemised(
        "Moisture mapping and thermal imaging assessments",
        vec![LabourLine::priced(
            LabourTier::MasterQualified,
            assessments,
            rates,
        )],
        vec![EquipmentLine::new(
            "Thermal imaging camera",
            1.0,
            assessments,
            "assessment",
            rates.get(RateKey::ThermalCameraUsePerAssessment),
        )],
    );

    sequence.flat(
        "Daily monitoring and psychrometric readings",
        ctx.days(),
        "visit",
        rates.get(RateKey::QualifiedTechnicianNormalHours),
    );

    if signals.needs_class4 && signals.has_yellow_tongue {
        sequence.itemised(
            "Class 4 specialty drying protocol (yellow tongue subfloor)",
            vec![
                LabourLine::priced(LabourTier::MasterQualified, CLASS4_MASTER_HOURS, rates),
                LabourLine::priced(
                    LabourTier::QualifiedTechnician,
                    CLASS4_QUALIFIED_HOURS,
                    rates,
                ),
            ],
            vec![EquipmentLine::new(
                "Injection drying system",
                1.0,
                ctx.days(),
                "day",
                rates.get(RateKey::InjectionDryingSystemDailyRate),
            )],
        );
    }

    let treatment = select_chemical_treatment(signals);
    let treated_area = if ctx.area_known() {
        ctx.affected_area_sqm
    } else {
        0.0
    };
    sequence.flat(
        treatment.label(),
        treated_area,
        "m²",
        rates.get(chemical_rate_key(treatment)),
    );

    sequence.itemised(
        "Equipment collection and decommissioning",
        vec![LabourLine::priced(
            LabourTier::Labourer,
            handling_hours(ctx.equipment.total_units()),
            rates,
        )],
        Vec::new(),
    );

    sequence.flat(
        "Final moisture verification and drying certification",
        CERTIFICATION_HOURS,
        "hours",
        rates.get(RateKey::MasterQualifiedNormalHours),
    );

    sequence.flat(
        "Administration and claim documentation",
        1.0,
        "claim",
        rates.get(RateKey::AdministrationFee),
    );

    sequence.items
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::input::lenient_number;
use super::rates::{RateKey, RateTable};

/// Equipment family derived from the `groupId` prefix convention.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentClass {
    AirMover,
    Lgr,
    Desiccant,
    Afd,
    Heat,
    #[default]
    Other,
}

impl EquipmentClass {
    /// Bucket order used for line-item breakdowns.
    pub const fn ordered() -> [Self; 6] {
        [
            Self::AirMover,
            Self::Lgr,
            Self::Desiccant,
            Self::Afd,
            Self::Heat,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AirMover => "Air movers",
            Self::Lgr => "LGR dehumidifiers",
            Self::Desiccant => "Desiccant dehumidifiers",
            Self::Afd => "Air filtration devices (AFD)",
            Self::Heat => "Heat drying units",
            Self::Other => "Other equipment",
        }
    }

    /// Prefix rules, checked in priority order.
    pub fn classify(group_id: &str) -> Self {
        if group_id.starts_with("lgr-") {
            Self::Lgr
        } else if group_id.starts_with("desiccant-") {
            Self::Desiccant
        } else if group_id.starts_with("airmover-") {
            Self::AirMover
        } else if group_id.starts_with("heat-") {
            Self::Heat
        } else if group_id.contains("afd") {
            Self::Afd
        } else {
            Self::Other
        }
    }
}

/// A `groupId` parsed once at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EquipmentGroup {
    id: String,
    class: EquipmentClass,
}

impl EquipmentGroup {
    pub fn parse(id: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            class: EquipmentClass::classify(id.trim()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class(&self) -> EquipmentClass {
        self.class
    }

    /// Rate used when the selection carries no daily rate of its own.
    pub fn default_rate_key(&self) -> Option<RateKey> {
        match self.class {
            EquipmentClass::AirMover if self.id.starts_with("airmover-centrifugal") => {
                Some(RateKey::AirMoverCentrifugalDailyRate)
            }
            EquipmentClass::AirMover => Some(RateKey::AirMoverAxialDailyRate),
            EquipmentClass::Lgr => Some(RateKey::DehumidifierLgrDailyRate),
            EquipmentClass::Desiccant => Some(RateKey::DehumidifierDesiccantDailyRate),
            EquipmentClass::Afd => Some(RateKey::AfdUnitLargeDailyRate),
            EquipmentClass::Heat => Some(RateKey::HeatDryingUnitDailyRate),
            EquipmentClass::Other => None,
        }
    }
}

impl From<String> for EquipmentGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EquipmentGroup> for String {
    fn from(value: EquipmentGroup) -> Self {
        value.id
    }
}

/// One row of the technician's equipment selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSelection {
    #[serde(default)]
    pub group_id: EquipmentGroup,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: f64,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub daily_rate: Option<f64>,
}

impl EquipmentSelection {
    pub fn new(group_id: &str, quantity: f64) -> Self {
        Self {
            group_id: EquipmentGroup::parse(group_id),
            quantity,
            daily_rate: None,
        }
    }

    pub fn with_daily_rate(mut self, rate: f64) -> Self {
        self.daily_rate = Some(rate);
        self
    }

    fn resolved_rate(&self, rates: &RateTable) -> f64 {
        match self.daily_rate {
            Some(rate) if rate > 0.0 => rate,
            _ => self
                .group_id
                .default_rate_key()
                .map(|key| rates.get(key))
                .unwrap_or(0.0),
        }
    }
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_number(deserializer).map(|quantity| quantity.unwrap_or(0.0))
}

/// A selection row after rate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedItem {
    pub group_id: String,
    pub quantity: f64,
    pub daily_rate: f64,
}

impl DeployedItem {
    pub fn cost(&self, days: u32) -> f64 {
        self.quantity * f64::from(days) * self.daily_rate
    }
}

/// Per-class totals feeding the equipment deployment line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentBucket {
    pub class: EquipmentClass,
    pub qty: f64,
    pub days: u32,
    /// Shared item rate, or the quantity-weighted mean when items differ.
    pub daily_rate: f64,
    pub cost: f64,
    pub items: Vec<DeployedItem>,
}

impl EquipmentBucket {
    fn new(class: EquipmentClass, days: u32) -> Self {
        Self {
            class,
            qty: 0.0,
            days,
            daily_rate: 0.0,
            cost: 0.0,
            items: Vec::new(),
        }
    }

    pub fn has_uniform_rate(&self) -> bool {
        self.items
            .windows(2)
            .all(|pair| pair[0].daily_rate == pair[1].daily_rate)
    }

    fn settle(&mut self) {
        self.qty = self.items.iter().map(|item| item.quantity).sum();
        self.cost = self.items.iter().map(|item| item.cost(self.days)).sum();
        self.daily_rate = match self.items.first() {
            Some(first) if self.has_uniform_rate() => first.daily_rate,
            _ if self.qty > 0.0 => {
                let weighted: f64 = self
                    .items
                    .iter()
                    .map(|item| item.quantity * item.daily_rate)
                    .sum();
                weighted / self.qty
            }
            _ => 0.0,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub air_movers_qty: f64,
    pub dehumidifiers_qty: f64,
    pub afd_qty: f64,
    pub heat_qty: f64,
    pub other_qty: f64,
    /// Non-empty buckets only, in [`EquipmentClass::ordered`] order.
    pub buckets: Vec<EquipmentBucket>,
}

impl EquipmentSummary {
    pub fn bucket(&self, class: EquipmentClass) -> Option<&EquipmentBucket> {
        self.buckets.iter().find(|bucket| bucket.class == class)
    }

    pub fn total_units(&self) -> f64 {
        self.buckets.iter().map(|bucket| bucket.qty).sum()
    }

    fn qty_for(buckets: &[EquipmentBucket], class: EquipmentClass) -> f64 {
        buckets
            .iter()
            .find(|bucket| bucket.class == class)
            .map(|bucket| bucket.qty)
            .unwrap_or(0.0)
    }
}

pub fn aggregate_equipment(
    selection: &[EquipmentSelection],
    rates: &RateTable,
    days: u32,
) -> EquipmentSummary {
    let mut buckets: Vec<EquipmentBucket> = EquipmentClass::ordered()
        .into_iter()
        .map(|class| EquipmentBucket::new(class, days))
        .collect();

    for entry in selection {
        if !(entry.quantity.is_finite() && entry.quantity > 0.0) {
            debug!(group_id = entry.group_id.id(), "skipping equipment with no quantity");
            continue;
        }

        let class = entry.group_id.class();
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.class == class) {
            bucket.items.push(DeployedItem {
                group_id: entry.group_id.id().to_string(),
                quantity: entry.quantity,
                daily_rate: entry.resolved_rate(rates),
            });
        }
    }

    buckets.retain(|bucket| !bucket.items.is_empty());
    buckets.iter_mut().for_each(EquipmentBucket::settle);

    EquipmentSummary {
        air_movers_qty: EquipmentSummary::qty_for(&buckets, EquipmentClass::AirMover),
        dehumidifiers_qty: EquipmentSummary::qty_for(&buckets, EquipmentClass::Lgr)
            + EquipmentSummary::qty_for(&buckets, EquipmentClass::Desiccant),
        afd_qty: EquipmentSummary::qty_for(&buckets, EquipmentClass::Afd),
        heat_qty: EquipmentSummary::qty_for(&buckets, EquipmentClass::Heat),
        other_qty: EquipmentSummary::qty_for(&buckets, EquipmentClass::Other),
        buckets,
    }
}

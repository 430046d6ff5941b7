use serde::{Deserialize, Serialize};

use super::signals::ScopeSignals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeKind {
    Plumbing,
    Electrical,
    #[serde(rename = "Builder/Carpenter")]
    Builder,
    #[serde(rename = "Mould Remediation")]
    MouldRemediation,
    #[serde(rename = "Asbestos Assessment & Abatement")]
    AsbestosAbatement,
}

impl TradeKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::Builder => "Builder/Carpenter",
            Self::MouldRemediation => "Mould Remediation",
            Self::AsbestosAbatement => "Asbestos Assessment & Abatement",
        }
    }
}

/// Work that must be quoted separately by a licensed contractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensedTrade {
    pub trade: TradeKind,
    pub trigger: String,
    pub scope: String,
    pub cost_status: String,
    pub timeline: String,
}

struct TradeRule {
    trade: TradeKind,
    applies: fn(&ScopeSignals) -> bool,
    trigger: &'static str,
    scope: &'static str,
    timeline: &'static str,
}

const COST_STATUS: &str = "Excluded - separate quote required from licensed contractor";

const TRADE_RULES: &[TradeRule] = &[
    TradeRule {
        trade: TradeKind::Plumbing,
        applies: |signals| signals.needs_plumber,
        trigger: "Water source identified as a burst pipe or toilet overflow",
        scope: "Locate and repair the source of the leak; pressure test affected lines",
        timeline: "Before drying commences",
    },
    TradeRule {
        trade: TradeKind::Electrical,
        applies: |signals| signals.needs_electrician,
        trigger: "Electrical services reported as affected by water",
        scope: "Isolate and safety test affected circuits; issue a certificate of compliance",
        timeline: "Before equipment is energised",
    },
    TradeRule {
        trade: TradeKind::Builder,
        applies: |signals| signals.needs_builder,
        trigger: "Structural concerns identified during inspection",
        scope: "Assess and repair damaged structural elements, linings and joinery",
        timeline: "After drying is verified complete",
    },
    TradeRule {
        trade: TradeKind::MouldRemediation,
        applies: ScopeSignals::has_mould,
        trigger: "Visible mould growth reported",
        scope: "Containment, HEPA removal and clearance testing of mould-affected materials",
        timeline: "Before or alongside drying, per containment plan",
    },
    TradeRule {
        trade: TradeKind::AsbestosAbatement,
        applies: ScopeSignals::has_asbestos,
        trigger: "Suspected asbestos-containing materials present",
        scope: "Sampling by a licensed assessor; licensed removal if confirmed",
        timeline: "Before any disturbance of affected materials",
    },
];

/// Licensed trades implied by the job's signals, in fixed order.
pub fn detect_trades(signals: &ScopeSignals) -> Vec<LicensedTrade> {
    TRADE_RULES
        .iter()
        .filter(|rule| (rule.applies)(signals))
        .map(|rule| LicensedTrade {
            trade: rule.trade,
            trigger: rule.trigger.to_string(),
            scope: rule.scope.to_string(),
            cost_status: COST_STATUS.to_string(),
            timeline: rule.timeline.to_string(),
        })
        .collect()
}

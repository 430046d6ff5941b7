//! Markdown rendering of a [`ScopeOfWorksData`].
//!
//! The compiler never trusts stored subtotals: every figure in Section 2 is
//! recomputed from the item's own rate or breakdown and compared with what was
//! stored.

use chrono::{Days, NaiveDate};

use super::domain::{ScopeError, ScopeOfWorksData};
use super::line_items::{round_cents, EquipmentLine, LabourLine, LineItem};
use super::signals::WaterCategory;
use super::trades::TradeKind;

pub const DOCUMENT_TITLE: &str = "# PRELIMINARY SCOPE OF WORKS — NOT FINAL ESTIMATE";
pub const NO_TRADES_MESSAGE: &str = "No licensed trades required for this scope.";
pub const PLUMBING_FIRST: &str = "Plumbing must be completed BEFORE drying begins";

const DRIFT_TOLERANCE: f64 = 0.01;
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Render the six-part scope document.
pub fn compile_document(data: &ScopeOfWorksData) -> Result<String, ScopeError> {
    let mut lines = Vec::new();

    render_header(data, &mut lines);
    render_phases(data, &mut lines)?;
    render_works(data, &mut lines)?;
    render_trades(data, &mut lines);
    render_claim_breakdown(data, &mut lines);
    render_coordination(data, &mut lines);

    Ok(lines.join("\n"))
}

/// `$1,234.50`
pub fn format_money(amount: f64) -> String {
    let cents = (round_cents(amount).abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Whole numbers without decimals, everything else to at most two places.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Calendar date of job day `day` (day 1 is the scope date).
fn job_day(start: NaiveDate, day: u32) -> Result<NaiveDate, ScopeError> {
    start
        .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        .ok_or(ScopeError::ScheduleOutOfRange { start, days: day })
}

fn render_header(data: &ScopeOfWorksData, lines: &mut Vec<String>) {
    lines.push(DOCUMENT_TITLE.to_string());
    lines.push(String::new());
    lines.push(format!("**Claim Reference:** {}", data.claim_reference));
    lines.push(format!("**Report ID:** {}", data.report_id));
    lines.push(format!("**Date:** {}", format_date(data.date)));
    lines.push(format!("**Version:** {}", data.version));
    lines.push(format!("**Service Type:** {}", data.service_type.label()));

    let state = data
        .state_info
        .as_ref()
        .and_then(|info| info.display_name())
        .unwrap_or_else(|| "Not specified".to_string());
    lines.push(format!("**State:** {state}"));

    lines.push(format!(
        "**Water Category:** {} ({})",
        data.water_category.label(),
        data.water_category.description()
    ));

    let area = if data.affected_area_sqm > 0.0 {
        format!("{} m²", format_quantity(data.affected_area_sqm))
    } else {
        "Not recorded".to_string()
    };
    lines.push(format!("**Affected Area:** {area}"));
    lines.push(format!(
        "**Estimated Drying Duration:** {} days",
        data.drying_duration
    ));

    if let Some(water_class) = data
        .psychrometric_assessment
        .as_ref()
        .and_then(|assessment| assessment.water_class.as_deref())
    {
        lines.push(format!("**Psychrometric Class:** {water_class}"));
    }

    if !data.hazards.is_empty() {
        lines.push(format!("**Reported Hazards:** {}", data.hazards.join(", ")));
    }

    lines.push(String::new());
    lines.push(
        "_This document is a preliminary estimate based on initial inspection data. \
         Final costs are subject to site verification and insurer approval._"
            .to_string(),
    );
    lines.push(String::new());
}

fn render_phases(data: &ScopeOfWorksData, lines: &mut Vec<String>) -> Result<(), ScopeError> {
    let days = data.drying_duration.max(1);
    let verification_day = days.saturating_add(1);
    let drying_start = job_day(data.date, 1)?;
    let drying_end = job_day(data.date, days)?;
    let verification_end = job_day(data.date, verification_day)?;

    lines.push("# SECTION 1: REMEDIATION PHASES".to_string());
    lines.push(String::new());
    lines.push(format!(
        "## Phase 1: Emergency Response & Make Safe (Day 1, {})",
        format_date(drying_start)
    ));
    lines.push(
        "- Isolate the water source, make the site safe and extract standing water".to_string(),
    );
    lines.push(String::new());
    lines.push(format!(
        "## Phase 2: Structural Drying (Days 1-{days}, {} to {})",
        format_date(drying_start),
        format_date(drying_end)
    ));
    lines.push("- Deploy drying equipment and monitor moisture daily".to_string());
    lines.push(String::new());
    lines.push(format!(
        "## Phase 3: Verification & Certification (Days {days}-{verification_day}, {} to {})",
        format_date(drying_end),
        format_date(verification_end)
    ));
    lines.push(
        "- Confirm drying goals are met, decommission equipment and certify".to_string(),
    );
    lines.push(String::new());
    lines.push("## Phase 4: Licensed Trade Repairs".to_string());
    lines.push("- Trades listed in Section 3 complete their works in sequence".to_string());
    lines.push(String::new());
    lines.push("## Phase 5: Reinstatement".to_string());
    lines.push("- Reinstatement of finishes, subject to insurer approval".to_string());
    lines.push(String::new());
    Ok(())
}

fn checked_subtotal(item: &LineItem) -> Result<f64, ScopeError> {
    let recomputed = item.recompute_subtotal();
    if (item.subtotal - recomputed).abs() >= DRIFT_TOLERANCE {
        return Err(ScopeError::SubtotalDrift {
            id: item.id.clone(),
            stored: item.subtotal,
            recomputed,
        });
    }
    Ok(recomputed)
}

fn labour_row(line: &LabourLine) -> String {
    format!(
        "  - {}: {} hrs × {}/hr = {}",
        line.tier.label(),
        format_quantity(line.hours),
        format_money(line.rate),
        format_money(line.cost())
    )
}

fn equipment_row(line: &EquipmentLine) -> String {
    format!(
        "  - {}: {} × {} {} × {} = {}",
        line.description,
        format_quantity(line.units),
        format_quantity(line.periods),
        line.period_unit,
        format_money(line.rate),
        format_money(line.cost())
    )
}

fn render_works(data: &ScopeOfWorksData, lines: &mut Vec<String>) -> Result<(), ScopeError> {
    lines.push("# SECTION 2: RESTORATION WORKS".to_string());
    lines.push(String::new());

    let mut total = 0.0;
    for item in &data.line_items {
        let subtotal = checked_subtotal(item)?;
        total += subtotal;

        lines.push(format!("## {}: {}", item.id, item.description));
        lines.push(format!(
            "- Quantity: {} {} @ {} = {}",
            format_quantity(item.qty),
            item.unit,
            format_money(item.effective_rate()),
            format_money(subtotal)
        ));

        if !item.labour.is_empty() {
            lines.push("- Labour:".to_string());
            lines.extend(item.labour.iter().map(labour_row));
        }
        if !item.equipment.is_empty() {
            lines.push("- Equipment:".to_string());
            lines.extend(item.equipment.iter().map(equipment_row));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "**Total Restoration Works (ex GST): {}**",
        format_money(round_cents(total))
    ));
    lines.push(String::new());
    Ok(())
}

fn render_trades(data: &ScopeOfWorksData, lines: &mut Vec<String>) {
    lines.push("# SECTION 3: LICENSED TRADES".to_string());
    lines.push(String::new());

    if data.licensed_trades.is_empty() {
        lines.push(NO_TRADES_MESSAGE.to_string());
        lines.push(String::new());
        return;
    }

    for trade in &data.licensed_trades {
        lines.push(format!("## {}", trade.trade.label()));
        lines.push(format!("- Trigger: {}", trade.trigger));
        lines.push(format!("- Scope: {}", trade.scope));
        lines.push(format!("- Cost: {}", trade.cost_status));
        lines.push(format!("- Timeline: {}", trade.timeline));
        lines.push(String::new());
    }
}

fn render_claim_breakdown(data: &ScopeOfWorksData, lines: &mut Vec<String>) {
    lines.push("# SECTION 4: INSURANCE CLAIM BREAKDOWN".to_string());
    lines.push(String::new());

    lines.push("## Building".to_string());
    lines.push(format!(
        "- Emergency mitigation and structural drying (Section 2): {}",
        format_money(data.total())
    ));
    if data.has_class4_drying {
        lines.push(
            "- Class 4 specialty drying of yellow tongue subfloor (included above)".to_string(),
        );
    }
    if !data.licensed_trades.is_empty() {
        let trades: Vec<&str> = data
            .licensed_trades
            .iter()
            .map(|trade| trade.trade.label())
            .collect();
        lines.push(format!(
            "- Licensed trade repairs ({}): separate quotes required",
            trades.join(", ")
        ));
    }
    lines.push(String::new());

    lines.push("## Contents".to_string());
    if data.water_category == WaterCategory::Category3 {
        lines.push(
            "- Porous contents in contact with Category 3 water are generally non-restorable"
                .to_string(),
        );
    }
    lines.push("- Contents cleaning, pack-out and restoration assessed separately".to_string());
    lines.push(String::new());

    lines.push("## Additional Living Expenses".to_string());
    if data.water_category == WaterCategory::Category3 || !data.hazards.is_empty() {
        lines.push(format!(
            "- Temporary accommodation recommended for the {}-day drying period due to \
             contamination or reported hazards",
            data.drying_duration
        ));
    } else {
        lines.push(
            "- Occupants may remain on site during drying, subject to access and equipment noise"
                .to_string(),
        );
    }
    lines.push(String::new());
}

fn render_coordination(data: &ScopeOfWorksData, lines: &mut Vec<String>) {
    let has_trade = |kind: TradeKind| {
        data.licensed_trades
            .iter()
            .any(|trade| trade.trade == kind)
    };

    lines.push("# SECTION 5: COORDINATION & SEQUENCING".to_string());
    lines.push(String::new());

    if has_trade(TradeKind::Plumbing) {
        lines.push(format!("- {PLUMBING_FIRST}"));
    }
    if has_trade(TradeKind::Electrical) {
        lines.push(
            "- Electrical isolation and safety testing required before equipment is energised"
                .to_string(),
        );
    }
    if has_trade(TradeKind::AsbestosAbatement) {
        lines.push(
            "- Asbestos clearance required before any affected materials are disturbed"
                .to_string(),
        );
    }
    if has_trade(TradeKind::MouldRemediation) {
        lines.push("- Mould containment must be in place before air movers run".to_string());
    }
    if data.has_class4_drying {
        lines.push(
            "- Injection drying panels installed once bulk water is extracted".to_string(),
        );
    }
    lines.push(format!(
        "- Daily monitoring continues until drying goals are met (estimated {} days)",
        data.drying_duration
    ));
    lines.push("- Equipment is collected only after final moisture verification".to_string());
    if has_trade(TradeKind::Builder) {
        lines.push("- Builder/carpenter repairs commence after drying certification".to_string());
    }
}

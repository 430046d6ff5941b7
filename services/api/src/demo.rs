use crate::infra::InMemoryScopeRepository;
use chrono::{Local, NaiveDate};
use clap::Args;
use restore_scope::config::AppConfig;
use restore_scope::error::AppError;
use restore_scope::telemetry;
use restore_scope::workflows::scope_of_works::{
    AnswerBag, EquipmentSelection, PricingConfig, RateKey, ReportRecord, ScopeInput, ScopeOfWorks,
    ScopeOfWorksData, ScopeOfWorksEngine, ScopeOfWorksService, StateInfo,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScopeGenerateArgs {
    /// JSON file holding report, answers, pricing and equipment selection
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Scope date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Print the structured data as JSON instead of the rendered document
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scope date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Print the full rendered document after the summary
    #[arg(long)]
    pub(crate) show_document: bool,
}

pub(crate) fn run_scope_generate(args: ScopeGenerateArgs) -> Result<(), AppError> {
    let ScopeGenerateArgs { input, date, json } = args;

    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;

    let raw = std::fs::read_to_string(&input)?;
    let scope_input: ScopeInput = serde_json::from_str(&raw)?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let ScopeOfWorks { data, document } =
        ScopeOfWorksEngine::new(config.scope).generate(&scope_input, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{document}");
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        show_document,
    } = args;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    println!("Scope of works demo: burst pipe, kitchen and dining");
    let repository = Arc::new(InMemoryScopeRepository::default());
    let service = ScopeOfWorksService::new(repository, ScopeOfWorksEngine::default());

    let input = sample_input();
    let first = service.generate(&input, date)?;
    render_summary(&first.data);

    println!("\nRegenerating after the technician adds a desiccant unit");
    let mut revised = input;
    revised
        .equipment_selection
        .push(EquipmentSelection::new("desiccant-compact", 1.0));
    let second = service.generate(&revised, date)?;
    println!(
        "- Stored version {} (was {}); total {:.2} -> {:.2}",
        second.data.version,
        first.data.version,
        first.data.total(),
        second.data.total()
    );
    println!(
        "- Versions on file: {:?}",
        service.versions(&second.data.report_id)?
    );

    if show_document {
        println!("\n{}", second.document);
    }

    Ok(())
}

fn render_summary(data: &ScopeOfWorksData) {
    println!(
        "- Claim {} | {} | {} | {} days drying",
        data.claim_reference,
        data.service_type.label(),
        data.water_category.label(),
        data.drying_duration
    );
    println!("Line items:");
    for item in &data.line_items {
        println!(
            "  - {} {:<58} {:>10.2}",
            item.id, item.description, item.subtotal
        );
    }
    println!("  Total (ex GST): {:.2}", data.total());

    if data.licensed_trades.is_empty() {
        println!("Licensed trades: none");
    } else {
        println!("Licensed trades:");
        for trade in &data.licensed_trades {
            println!("  - {}: {}", trade.trade.label(), trade.trigger);
        }
    }
}

/// Burst pipe job used by the demo and the service smoke tests.
pub(crate) fn sample_input() -> ScopeInput {
    let pricing = PricingConfig::default()
        .with(RateKey::MasterQualifiedNormalHours, json!(135))
        .with(RateKey::QualifiedTechnicianNormalHours, json!(98))
        .with(RateKey::LabourerNormalHours, json!(65))
        .with(RateKey::AirMoverAxialDailyRate, json!(35))
        .with(RateKey::AirMoverCentrifugalDailyRate, json!(42))
        .with(RateKey::DehumidifierLgrDailyRate, json!(95))
        .with(RateKey::DehumidifierDesiccantDailyRate, json!(145))
        .with(RateKey::AfdUnitLargeDailyRate, json!(80))
        .with(RateKey::HeatDryingUnitDailyRate, json!(120))
        .with(RateKey::InjectionDryingSystemDailyRate, json!(150))
        .with(RateKey::ExtractionTruckMountedHourlyRate, json!(220))
        .with(RateKey::ExtractionElectricHourlyRate, json!("$85.00"))
        .with(RateKey::ThermalCameraUsePerAssessment, json!(75))
        .with(RateKey::MinimumCallOutCharge, json!(250))
        .with(RateKey::AdministrationFee, json!(120))
        .with(RateKey::AntimicrobialTreatmentRate, json!(8.5))
        .with(RateKey::MouldRemediationTreatmentRate, json!(22))
        .with(RateKey::BiohazardTreatmentRate, json!(35));

    ScopeInput {
        report: ReportRecord {
            id: "rpt-demo-001".to_string(),
            claim_reference_number: Some("CLM-DEMO-2024".to_string()),
            affected_area: Some(34.0),
            ..ReportRecord::default()
        },
        tier1: Some(
            AnswerBag::default()
                .with(
                    "T1_Q3_waterSource",
                    json!("Burst pipe behind dishwasher, clean water"),
                )
                .with(
                    "T1_Q6_materialsAffected",
                    json!(["Carpet", "Yellow tongue particleboard", "Plasterboard"]),
                )
                .with("T1_Q7_hazards", json!(["None identified"])),
        ),
        tier2: Some(
            AnswerBag::default()
                .with("T2_Q1_structuralConcerns", json!(["Swollen kickboards"]))
                .with("T2_Q3_buildingServicesAffected", json!(["Electrical outlets"])),
        ),
        tier3: Some(
            AnswerBag::default()
                .with("T3_Q1_class4DryingAssessment", json!("Class 4 subfloor"))
                .with("T3_Q4_totalAffectedArea", json!("approx 34 m²")),
        ),
        pricing_config: Some(pricing),
        state_info: Some(StateInfo {
            state: Some("QLD".to_string()),
            state_name: Some("Queensland".to_string()),
            ..StateInfo::default()
        }),
        equipment_selection: vec![
            EquipmentSelection::new("airmover-axial", 6.0),
            EquipmentSelection::new("lgr-large", 2.0),
            EquipmentSelection::new("afd-hepa-500", 1.0),
        ],
        ..ScopeInput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_input_generates_a_full_scope() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date");
        let scope = ScopeOfWorksEngine::default()
            .generate(&sample_input(), date)
            .expect("sample generates");

        assert!(scope.data.has_class4_drying);
        assert_eq!(scope.data.drying_duration, 14);
        assert_eq!(scope.data.licensed_trades.len(), 3);
        assert!(scope.data.total() > 0.0);
    }
}

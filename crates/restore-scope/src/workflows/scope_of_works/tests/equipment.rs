use serde_json::json;

use crate::workflows::scope_of_works::{
    aggregate_equipment, resolve_rates, EquipmentClass, EquipmentGroup, EquipmentSelection,
    PricingConfig, RateKey, RateTable,
};

fn rates() -> RateTable {
    let config = PricingConfig::uniform(100.0)
        .with(RateKey::AirMoverAxialDailyRate, json!(45))
        .with(RateKey::AirMoverCentrifugalDailyRate, json!(60))
        .with(RateKey::DehumidifierLgrDailyRate, json!(120))
        .with(RateKey::DehumidifierDesiccantDailyRate, json!(180));
    resolve_rates(Some(&config)).expect("rates resolve")
}

#[test]
fn group_prefixes_classify_in_priority_order() {
    let class = |id: &str| EquipmentGroup::parse(id).class();

    assert_eq!(class("lgr-large"), EquipmentClass::Lgr);
    assert_eq!(class("lgr-afd-combo"), EquipmentClass::Lgr);
    assert_eq!(class("desiccant-1500"), EquipmentClass::Desiccant);
    assert_eq!(class("airmover-centrifugal"), EquipmentClass::AirMover);
    assert_eq!(class("heat-drymatic"), EquipmentClass::Heat);
    assert_eq!(class("hepa-afd-500"), EquipmentClass::Afd);
    assert_eq!(class("moisture-meter"), EquipmentClass::Other);
    assert_eq!(class("Airmover-axial"), EquipmentClass::Other);
}

#[test]
fn bucket_totals_use_duration_and_table_rates() {
    let selection = vec![
        EquipmentSelection::new("airmover-axial", 3.0),
        EquipmentSelection::new("lgr-large", 2.0),
    ];

    let summary = aggregate_equipment(&selection, &rates(), 7);

    assert_eq!(summary.air_movers_qty, 3.0);
    assert_eq!(summary.dehumidifiers_qty, 2.0);
    assert_eq!(summary.total_units(), 5.0);

    let lgr = summary.bucket(EquipmentClass::Lgr).expect("lgr bucket");
    assert_eq!(lgr.cost, 2.0 * 7.0 * 120.0);
    assert_eq!(lgr.daily_rate, 120.0);
    let air = summary.bucket(EquipmentClass::AirMover).expect("air mover bucket");
    assert_eq!(air.cost, 3.0 * 7.0 * 45.0);
}

#[test]
fn buckets_keep_fixed_order_and_skip_empty_classes() {
    let selection = vec![
        EquipmentSelection::new("thermal-fogger", 1.0),
        EquipmentSelection::new("lgr-large", 1.0),
        EquipmentSelection::new("airmover-axial", 2.0),
    ];

    let summary = aggregate_equipment(&selection, &rates(), 5);
    let classes: Vec<_> = summary.buckets.iter().map(|bucket| bucket.class).collect();
    assert_eq!(
        classes,
        vec![
            EquipmentClass::AirMover,
            EquipmentClass::Lgr,
            EquipmentClass::Other
        ]
    );
    assert_eq!(summary.other_qty, 1.0);
    let other = summary.bucket(EquipmentClass::Other).expect("unknown kit is kept");
    assert_eq!(other.cost, 0.0);
}

#[test]
fn selection_rate_overrides_table_unless_zero() {
    let selection = vec![
        EquipmentSelection::new("desiccant-1500", 1.0).with_daily_rate(150.0),
        EquipmentSelection::new("heat-drymatic", 1.0).with_daily_rate(0.0),
    ];

    let summary = aggregate_equipment(&selection, &rates(), 4);
    assert_eq!(
        summary
            .bucket(EquipmentClass::Desiccant)
            .map(|bucket| bucket.cost),
        Some(600.0)
    );
    assert_eq!(
        summary.bucket(EquipmentClass::Heat).map(|bucket| bucket.cost),
        Some(400.0)
    );
}

#[test]
fn mixed_rates_report_weighted_mean() {
    let selection = vec![
        EquipmentSelection::new("airmover-axial", 2.0).with_daily_rate(40.0),
        EquipmentSelection::new("airmover-centrifugal", 2.0),
    ];

    let summary = aggregate_equipment(&selection, &rates(), 7);
    let bucket = summary
        .bucket(EquipmentClass::AirMover)
        .expect("air mover bucket");

    assert!(!bucket.has_uniform_rate());
    assert_eq!(bucket.daily_rate, 50.0);
    assert_eq!(bucket.cost, 2.0 * 7.0 * 40.0 + 2.0 * 7.0 * 60.0);
    assert_eq!(bucket.items.len(), 2);
}

#[test]
fn non_positive_quantities_contribute_nothing() {
    let selection = vec![
        EquipmentSelection::new("airmover-axial", 0.0),
        EquipmentSelection::new("lgr-large", -2.0),
        EquipmentSelection::new("lgr-large", f64::NAN),
    ];

    let summary = aggregate_equipment(&selection, &rates(), 7);
    assert!(summary.buckets.is_empty());
    assert_eq!(summary.total_units(), 0.0);
}

#[test]
fn selections_deserialize_leniently() {
    let selection: Vec<EquipmentSelection> = serde_json::from_value(json!([
        { "groupId": " lgr-large ", "quantity": "2", "dailyRate": "$95" },
        { "groupId": "hepa-afd-500" }
    ]))
    .expect("selections deserialize");

    assert_eq!(selection[0].group_id.id(), "lgr-large");
    assert_eq!(selection[0].group_id.class(), EquipmentClass::Lgr);
    assert_eq!(selection[0].quantity, 2.0);
    assert_eq!(selection[0].daily_rate, Some(95.0));
    assert_eq!(selection[1].quantity, 0.0);
    assert_eq!(selection[1].group_id.class(), EquipmentClass::Afd);
}

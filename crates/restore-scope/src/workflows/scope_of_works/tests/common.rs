use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::ScopeConfig;
use crate::workflows::scope_of_works::repository::{
    RepositoryError, ScopeRecord, ScopeRepository,
};
use crate::workflows::scope_of_works::{
    scope_router, PricingConfig, ScopeInput, ScopeOfWorksEngine, ScopeOfWorksService,
};

pub(super) fn scope_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
}

pub(super) fn engine() -> ScopeOfWorksEngine {
    ScopeOfWorksEngine::new(ScopeConfig::default())
}

pub(super) fn input_from(value: Value) -> ScopeInput {
    serde_json::from_value(value).expect("scope input deserializes")
}

/// All rates 100, 30 m² on the report, nothing else known.
pub(super) fn minimal_input() -> ScopeInput {
    input_from(json!({
        "report": {
            "id": "rpt-001",
            "claimReferenceNumber": "CLM-2024-0042",
            "affectedArea": 30
        },
        "pricingConfig": PricingConfig::uniform(100.0),
    }))
}

/// Burst pipe in a kitchen with wet yellow tongue subfloor and affected power points.
pub(super) fn burst_pipe_input() -> ScopeInput {
    input_from(json!({
        "report": {
            "id": "rpt-042",
            "claimReferenceNumber": "CLM-2024-0042",
            "affectedArea": 30
        },
        "analysis": {
            "waterCategory": "Category 2"
        },
        "tier1": {
            "T1_Q3_waterSource": "Burst pipe under kitchen sink, clean water",
            "T1_Q6_materialsAffected": ["Carpet", "Yellow tongue particleboard"],
            "T1_Q7_hazards": ["None"]
        },
        "tier2": {
            "T2_Q1_structuralConcerns": ["None identified"],
            "T2_Q3_buildingServicesAffected": ["Electrical outlets", "HVAC"]
        },
        "tier3": {
            "T3_Q1_class4DryingAssessment": "Class 4 - saturated subfloor",
            "T3_Q4_totalAffectedArea": "Approximately 30 m² across kitchen and dining"
        },
        "pricingConfig": PricingConfig::uniform(100.0),
        "stateInfo": {
            "state": "NSW",
            "stateName": "New South Wales"
        },
        "equipmentSelection": [
            { "groupId": "airmover-axial", "quantity": 4 },
            { "groupId": "lgr-large", "quantity": 2 }
        ],
        "psychrometricAssessment": {
            "waterClass": "Class 4",
            "temperature": 22.5,
            "humidity": 68
        }
    }))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<BTreeMap<String, Vec<ScopeRecord>>>,
}

impl ScopeRepository for MemoryRepository {
    fn save(&self, record: ScopeRecord) -> Result<ScopeRecord, RepositoryError> {
        let mut records = self.records.lock().expect("repository mutex poisoned");
        let versions = records.entry(record.report_id().to_string()).or_default();
        if versions
            .iter()
            .any(|stored| stored.version() == record.version())
        {
            return Err(RepositoryError::Conflict);
        }
        versions.push(record.clone());
        versions.sort_by_key(ScopeRecord::version);
        Ok(record)
    }

    fn fetch(&self, report_id: &str) -> Result<Option<ScopeRecord>, RepositoryError> {
        let records = self.records.lock().expect("repository mutex poisoned");
        Ok(records
            .get(report_id)
            .and_then(|versions| versions.last())
            .cloned())
    }

    fn versions(&self, report_id: &str) -> Result<Vec<u32>, RepositoryError> {
        let records = self.records.lock().expect("repository mutex poisoned");
        Ok(records
            .get(report_id)
            .map(|versions| versions.iter().map(ScopeRecord::version).collect())
            .unwrap_or_default())
    }
}

pub(super) struct UnavailableRepository;

impl ScopeRepository for UnavailableRepository {
    fn save(&self, _record: ScopeRecord) -> Result<ScopeRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _report_id: &str) -> Result<Option<ScopeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn versions(&self, _report_id: &str) -> Result<Vec<u32>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (ScopeOfWorksService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ScopeOfWorksService::new(repository.clone(), engine());
    (service, repository)
}

pub(super) fn router_with_service(
    service: ScopeOfWorksService<MemoryRepository>,
) -> axum::Router {
    scope_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use restore_scope::workflows::scope_of_works::{RepositoryError, ScopeRecord, ScopeRepository};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local scope store; versions per report kept in ascending order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryScopeRepository {
    records: Arc<Mutex<HashMap<String, Vec<ScopeRecord>>>>,
}

impl InMemoryScopeRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<ScopeRecord>>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ScopeRepository for InMemoryScopeRepository {
    fn save(&self, record: ScopeRecord) -> Result<ScopeRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let versions = guard.entry(record.report_id().to_string()).or_default();
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
        let guard = self.lock()?;
        Ok(guard
            .get(report_id)
            .and_then(|versions| versions.last())
            .cloned())
    }

    fn versions(&self, report_id: &str) -> Result<Vec<u32>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .get(report_id)
            .map(|versions| versions.iter().map(ScopeRecord::version).collect())
            .unwrap_or_default())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::sample_input;
    use restore_scope::workflows::scope_of_works::ScopeOfWorksEngine;

    fn record(version: u32) -> ScopeRecord {
        let mut input = sample_input();
        input.report.version = Some(version);
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date");
        ScopeOfWorksEngine::default()
            .generate(&input, date)
            .expect("sample generates")
            .into()
    }

    #[test]
    fn repository_keeps_versions_sorted_and_rejects_duplicates() {
        let repository = InMemoryScopeRepository::default();
        repository.save(record(2)).expect("v2 saved");
        repository.save(record(1)).expect("v1 saved");

        let report_id = record(1).report_id().to_string();
        assert_eq!(repository.versions(&report_id).expect("versions"), vec![1, 2]);
        assert_eq!(
            repository
                .fetch(&report_id)
                .expect("fetch")
                .map(|stored| stored.version()),
            Some(2)
        );
        assert!(matches!(
            repository.save(record(2)),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2024-05-02 "),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid"))
        );
        assert!(parse_date("02/05/2024")
            .expect_err("wrong format")
            .contains("YYYY-MM-DD"));
    }
}

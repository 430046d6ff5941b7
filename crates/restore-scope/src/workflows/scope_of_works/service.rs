use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::ScopeError;
use super::input::ScopeInput;
use super::repository::{RepositoryError, ScopeRecord, ScopeRepository};
use super::ScopeOfWorksEngine;

/// Runs the engine and persists each generated version.
pub struct ScopeOfWorksService<R> {
    repository: Arc<R>,
    engine: ScopeOfWorksEngine,
}

impl<R> ScopeOfWorksService<R>
where
    R: ScopeRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: ScopeOfWorksEngine) -> Self {
        Self { repository, engine }
    }

    pub fn engine(&self) -> &ScopeOfWorksEngine {
        &self.engine
    }

    /// Generate and store a new version for the input's report.
    ///
    /// A report without an explicit version is stamped one past the latest stored
    /// version, so regenerating never overwrites an earlier scope.
    pub fn generate(
        &self,
        input: &ScopeInput,
        date: NaiveDate,
    ) -> Result<ScopeRecord, ScopeServiceError> {
        if input.report.id.is_empty() {
            return Err(ScopeServiceError::MissingReportId);
        }

        let mut scope = self.engine.generate(input, date)?;

        if input.report.version.is_none() {
            if let Some(previous) = self.repository.fetch(&input.report.id)? {
                scope.data.version = previous
                    .version()
                    .checked_add(1)
                    .ok_or(RepositoryError::Conflict)?;
                scope.document = super::compile_document(&scope.data)?;
            }
        }

        let stored = self.repository.save(ScopeRecord::from(scope))?;
        info!(
            report_id = stored.report_id(),
            version = stored.version(),
            "scope of works stored"
        );
        Ok(stored)
    }

    /// Latest stored version for a report.
    pub fn latest(&self, report_id: &str) -> Result<ScopeRecord, ScopeServiceError> {
        let record = self
            .repository
            .fetch(report_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn versions(&self, report_id: &str) -> Result<Vec<u32>, ScopeServiceError> {
        Ok(self.repository.versions(report_id)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScopeServiceError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("report id is required to store a scope of works")]
    MissingReportId,
}

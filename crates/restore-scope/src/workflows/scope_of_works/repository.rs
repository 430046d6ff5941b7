use serde::{Deserialize, Serialize};

use super::domain::ScopeOfWorksData;
use super::ScopeOfWorks;

/// One persisted version of a report's scope of works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeRecord {
    pub data: ScopeOfWorksData,
    pub document: String,
}

impl ScopeRecord {
    pub fn report_id(&self) -> &str {
        &self.data.report_id
    }

    pub fn version(&self) -> u32 {
        self.data.version
    }
}

impl From<ScopeOfWorks> for ScopeRecord {
    fn from(value: ScopeOfWorks) -> Self {
        Self {
            data: value.data,
            document: value.document,
        }
    }
}

/// Storage abstraction keyed by report id; each save adds a version.
pub trait ScopeRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] if the report already has this version.
    fn save(&self, record: ScopeRecord) -> Result<ScopeRecord, RepositoryError>;
    /// Highest stored version for the report.
    fn fetch(&self, report_id: &str) -> Result<Option<ScopeRecord>, RepositoryError>;
    /// Stored version numbers, ascending.
    fn versions(&self, report_id: &str) -> Result<Vec<u32>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("scope version already exists")]
    Conflict,
    #[error("scope not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PersistedReport;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Destination for sanitized report rows.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Appends one row to `table`.
    async fn insert_report(
        &self,
        table: &str,
        report: &PersistedReport,
    ) -> Result<(), RepositoryError>;

    /// Most recent rows of `table`, newest first.
    async fn list_reports(
        &self,
        table: &str,
        limit: u32,
    ) -> Result<Vec<PersistedReport>, RepositoryError>;
}

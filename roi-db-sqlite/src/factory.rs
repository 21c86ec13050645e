use std::str::FromStr;

use async_trait::async_trait;
use roi_core::{BackendConfig, BackendFactory, RepositoryError, SyncBackend};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::blobs::FsBlobStore;
use crate::repository::SqliteReportRepository;

/// [`BackendFactory`] for the local backend: reports in SQLite, PDFs in a
/// directory.
///
/// ```rust,no_run
/// use roi_core::BackendRegistry;
/// use roi_db_sqlite::SqliteBackendFactory;
///
/// let mut registry = BackendRegistry::new();
/// registry.register(Box::new(SqliteBackendFactory));
/// ```
pub struct SqliteBackendFactory;

#[async_trait]
impl BackendFactory for SqliteBackendFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and run
    /// migrations.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"reports.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"`, an ephemeral in-memory database.
    ///
    /// PDFs are written below `config.blob_root`.
    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<SyncBackend, RepositoryError> {
        let in_memory = config.connection_string == ":memory:";
        let options = SqliteConnectOptions::from_str(&config.connection_string)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?
            .create_if_missing(true);

        // Every connection to `:memory:` is a separate database.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let reports = SqliteReportRepository::new_with_pool(pool);
        reports
            .run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(
            database = %config.connection_string,
            blobs = %config.blob_root.display(),
            "local sync backend ready"
        );

        Ok(SyncBackend {
            blobs: Box::new(FsBlobStore::new(&config.blob_root, config.public_base_url.clone())),
            reports: Box::new(reports),
        })
    }
}

#[cfg(test)]
mod tests {
    use roi_core::{BackendConfig, BackendFactory, BackendRegistry};

    use super::SqliteBackendFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteBackendFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_in_memory_backend_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(SqliteBackendFactory));
        let config = BackendConfig {
            blob_root: dir.path().to_path_buf(),
            ..BackendConfig::default()
        };

        let backend = registry.create(&config).await.unwrap();

        let rows = backend.reports.list_reports("laporan_roi", 5).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn creates_database_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("reports.db");
        let config = BackendConfig {
            connection_string: db_path.display().to_string(),
            blob_root: dir.path().join("blobs"),
            ..BackendConfig::default()
        };

        let result = SqliteBackendFactory.create(&config).await;

        assert!(result.is_ok(), "failed to create backend: {:#?}", result.err());
        assert!(db_path.exists());
    }
}

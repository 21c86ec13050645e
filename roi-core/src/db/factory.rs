use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use super::repository::{ReportRepository, RepositoryError};
use crate::storage::BlobStore;

/// Backend-agnostic connection configuration.
///
/// `backend` must match the [`BackendFactory::backend_name`] of a
/// registered factory. The remaining fields are forwarded unchanged and
/// interpreted by that factory.
///
/// | backend    | connection_string          | api_key  | blob_root / public_base_url |
/// |------------|----------------------------|----------|-----------------------------|
/// | `sqlite`   | `reports.db`, `:memory:`   | unused   | directory for PDFs / URL prefix |
/// | `supabase` | `https://xyz.supabase.co`  | required | unused                      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    pub connection_string: String,
    pub api_key: Option<String>,
    pub blob_root: PathBuf,
    pub public_base_url: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
            api_key: None,
            blob_root: PathBuf::from("blobs"),
            public_base_url: None,
        }
    }
}

/// The two halves of a sync destination.
pub struct SyncBackend {
    pub blobs: Box<dyn BlobStore>,
    pub reports: Box<dyn ReportRepository>,
}

impl std::fmt::Debug for SyncBackend {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SyncBackend").finish_non_exhaustive()
    }
}

/// One implementation per backend. Each backend crate exports a single unit
/// struct that implements this trait and is registered with a
/// [`BackendRegistry`] at startup.
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open connections and return a ready-to-use backend. Implementations
    /// may run migrations or create directories here.
    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<SyncBackend, RepositoryError>;
}

/// Registry of [`BackendFactory`] instances, keyed by backend name.
pub struct BackendRegistry {
    factories: HashMap<&'static str, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn BackendFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] if no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<SyncBackend, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use async_trait::async_trait;
use roi_core::{BackendConfig, BackendFactory, RepositoryError, SyncBackend};
use tracing::info;

use crate::client::SupabaseClient;
use crate::rest::SupabaseReportRepository;
use crate::storage::SupabaseBlobStore;

/// [`BackendFactory`] for a Supabase project.
///
/// `config.connection_string` is the project URL and `config.api_key` the
/// service or anon key. No request is made until the first sync.
pub struct SupabaseBackendFactory;

#[async_trait]
impl BackendFactory for SupabaseBackendFactory {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<SyncBackend, RepositoryError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| RepositoryError::Configuration("Supabase API key is not set".to_string()))?;

        let client = SupabaseClient::new(&config.connection_string, api_key)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;

        info!(project = %config.connection_string, "Supabase sync backend ready");
        Ok(SyncBackend {
            blobs: Box::new(SupabaseBlobStore::new(client.clone())),
            reports: Box::new(SupabaseReportRepository::new(client)),
        })
    }
}

#[cfg(test)]
mod tests {
    use roi_core::{BackendConfig, BackendFactory, RepositoryError};

    use super::SupabaseBackendFactory;

    fn config(
        url: &str,
        key: Option<&str>,
    ) -> BackendConfig {
        BackendConfig {
            backend: "supabase".to_string(),
            connection_string: url.to_string(),
            api_key: key.map(str::to_string),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn backend_name_is_supabase() {
        assert_eq!(SupabaseBackendFactory.backend_name(), "supabase");
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let result = SupabaseBackendFactory
            .create(&config("https://xyz.supabase.co", None))
            .await;

        assert!(matches!(result, Err(RepositoryError::Configuration(_))));
    }

    #[tokio::test]
    async fn bad_url_is_a_configuration_error() {
        let result = SupabaseBackendFactory.create(&config(":memory:", Some("key"))).await;

        assert!(matches!(result, Err(RepositoryError::Configuration(_))));
    }

    #[tokio::test]
    async fn valid_settings_create_backend_without_network() {
        let result = SupabaseBackendFactory
            .create(&config("https://xyz.supabase.co", Some("key")))
            .await;

        assert!(result.is_ok());
    }
}

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use roi_core::{BlobStore, StorageError};
use tracing::debug;

use crate::client::SupabaseClient;

/// Supabase Storage bucket access.
#[derive(Debug, Clone)]
pub struct SupabaseBlobStore {
    client: SupabaseClient,
}

impl SupabaseBlobStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

/// Storage reports an existing object either as HTTP 409 or as a 400 whose
/// body carries `"Duplicate"`.
pub(crate) fn is_duplicate(
    status: StatusCode,
    body: &str,
) -> bool {
    status == StatusCode::CONFLICT
        || body.contains("Duplicate")
        || body.contains("already exists")
}

#[async_trait]
impl BlobStore for SupabaseBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.client.endpoint(["storage", "v1", "object", bucket, key]);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(bucket, key, "object stored");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if is_duplicate(status, &body) {
            Err(StorageError::Duplicate {
                key: key.to_string(),
            })
        } else {
            Err(StorageError::Upload(format!("{status}: {body}")))
        }
    }

    fn public_url(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        Ok(self
            .client
            .endpoint(["storage", "v1", "object", "public", bucket, key])
            .to_string())
    }
}

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("object already exists: {key}")]
    Duplicate { key: String },

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("storage connection error: {0}")]
    Connection(String),

    #[error("storage configuration error: {0}")]
    Configuration(String),
}

/// Object storage addressed by bucket and key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key`.
    ///
    /// Must return [`StorageError::Duplicate`] rather than overwrite when
    /// the key is already taken.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public address of an object. Does not check that it exists.
    fn public_url(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<String, StorageError>;
}

/// How an upload ended up at its public address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Created(String),
    /// The key was already taken; the existing object's address is used.
    Reused(String),
}

impl UploadOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Created(url) | Self::Reused(url) => url,
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, Self::Reused(_))
    }
}

/// Uploads a PDF, treating an existing object at `key` as success.
pub async fn upload_or_reuse(
    store: &dyn BlobStore,
    bucket: &str,
    key: &str,
    bytes: Vec<u8>,
) -> Result<UploadOutcome, StorageError> {
    match store.upload(bucket, key, bytes, PDF_CONTENT_TYPE).await {
        Ok(()) => {
            let url = store.public_url(bucket, key)?;
            debug!(bucket, key, "uploaded");
            Ok(UploadOutcome::Created(url))
        }
        Err(StorageError::Duplicate { .. }) => {
            warn!(bucket, key, "file already exists in storage, using existing object");
            Ok(UploadOutcome::Reused(store.public_url(bucket, key)?))
        }
        Err(err) => Err(err),
    }
}

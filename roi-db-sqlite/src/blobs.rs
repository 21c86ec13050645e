use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use roi_core::{BlobStore, StorageError};
use tracing::debug;

/// Blob store backed by a local directory: `{root}/{bucket}/{key}`.
///
/// Objects are never overwritten. Public addresses are `file://` URLs
/// unless a `public_base_url` is configured, in which case they are
/// `{public_base_url}/{bucket}/{key}`.
/// Name prefix of partially written objects.
const STAGING_PREFIX: &str = ".upload-";

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl FsBlobStore {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of an object on disk.
    pub fn object_path(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<PathBuf, StorageError> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || bucket.is_empty() || key.is_empty() {
            return Err(StorageError::Configuration(format!(
                "object key must be a relative path: {bucket}/{key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::Configuration(format!("no parent directory: {}", path.display())))?;
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| StorageError::Upload(format!("{}: {}", parent.display(), e)))?;

        // The blocking task finishes even when the caller gives up waiting,
        // so the object either appears whole or not at all.
        let size = bytes.len();
        let key = key.to_string();
        let target = path.clone();
        tokio::task::spawn_blocking(move || publish(&parent, &target, &key, &bytes))
            .await
            .map_err(|e| StorageError::Upload(format!("{}: {}", path.display(), e)))??;

        debug!(path = %path.display(), bytes = size, "blob written");
        Ok(())
    }

    fn public_url(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        if let Some(base) = &self.public_base_url {
            return Ok(format!("{}/{}/{}", base, encode_path(bucket), encode_path(key)));
        }

        let path = self.object_path(bucket, key)?;
        let absolute = std::path::absolute(&path)
            .map_err(|e| StorageError::Configuration(format!("{}: {}", path.display(), e)))?;
        let display = absolute.to_string_lossy().replace('\\', "/");
        let prefix = if display.starts_with('/') { "file://" } else { "file:///" };
        Ok(format!("{prefix}{}", encode_path(&display)))
    }
}

/// Writes `bytes` to a temporary file next to `target`, then links it into
/// place without replacing an existing object.
fn publish(
    dir: &Path,
    target: &Path,
    key: &str,
    bytes: &[u8],
) -> Result<(), StorageError> {
    let upload_error = |e: std::io::Error| StorageError::Upload(format!("{}: {}", target.display(), e));

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)
        .map_err(upload_error)?;
    staged.write_all(bytes).map_err(upload_error)?;
    staged.as_file().sync_all().map_err(upload_error)?;

    staged.persist_noclobber(target).map_err(|e| match e.error.kind() {
        ErrorKind::AlreadyExists => StorageError::Duplicate { key: key.to_string() },
        _ => upload_error(e.error),
    })?;
    Ok(())
}

/// Percent-encodes the characters that commonly appear in report names.
fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            ' ' => encoded.push_str("%20"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            '%' => encoded.push_str("%25"),
            _ => encoded.push(ch),
        }
    }
    encoded
}

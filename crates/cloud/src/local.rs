//! Filesystem storage provider.
//!
//! Lays objects out as `<root>/<bucket>/<key>`. The content identifier is the
//! hex SHA-256 of the object, standing in for an S3 ETag.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use crm_core::storage::{ObjectStorage, StorageError};
use sha2::{Digest, Sha256};

/// [`ObjectStorage`] over a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `bucket/key` under the root, refusing anything that could escape it.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(bucket).join(key);
        let safe = !bucket.is_empty()
            && !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::Transfer {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "invalid object path".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, bucket: &str, key: &str, source: &Path) -> Result<String, StorageError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = tokio::fs::read(source).await?;
        tokio::fs::write(&path, &bytes).await?;

        let etag = format!("{:x}", Sha256::digest(&bytes));
        tracing::info!(%bucket, %key, %etag, "Stored object on local disk");
        Ok(etag)
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StorageError> {
        let path = self.object_path(bucket, key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let length = tokio::fs::copy(&path, destination).await?;
        tracing::info!(%bucket, %key, content_length = length, "Read object from local disk");
        Ok(length)
    }
}

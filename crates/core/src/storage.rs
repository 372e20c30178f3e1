//! Object storage boundary, backend selection, and profile-image key layout.

use std::path::Path;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Key prefix under which all profile images live.
pub const PROFILE_IMAGE_PREFIX: &str = "profile-images";

/// Default bucket for customer objects.
pub const DEFAULT_CUSTOMER_BUCKET: &str = "fileupload-customer";

/// Object key of a customer's profile image: `profile-images/{customer}/{image}`.
pub fn profile_image_key(customer_id: DbId, profile_image_id: &str) -> String {
    format!("{PROFILE_IMAGE_PREFIX}/{customer_id}/{profile_image_id}")
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Transfer of {bucket}/{key} failed: {message}")]
    Transfer {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// File-based transfer to and from a bucket.
///
/// Each call is a single blocking transfer from the caller's point of view:
/// no retries and no partial resume.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload the file at `source` to `bucket/key`, returning the content
    /// identifier (ETag) reported by the backend.
    async fn upload(&self, bucket: &str, key: &str, source: &Path) -> Result<String, StorageError>;

    /// Download `bucket/key` into `destination`, overwriting it. Returns the
    /// number of bytes written.
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StorageError>;
}

// ---------------------------------------------------------------------------
// Backend type
// ---------------------------------------------------------------------------

/// Configurable storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendType {
    Local,
    S3,
}

impl StorageBackendType {
    /// Parse from the `STORAGE_BACKEND` setting.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(CoreError::Validation(format!(
                "Unknown storage backend '{other}'. Must be one of: local, s3"
            ))),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "Local Filesystem",
            Self::S3 => "Amazon S3 / Compatible",
        }
    }
}

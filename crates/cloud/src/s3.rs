//! Amazon S3 storage provider.
//!
//! Objects are transferred whole between a local file and a bucket key with a
//! single `PutObject` / `GetObject` call. There is no multipart upload and no
//! retry beyond what the SDK's default retry policy does internally.

use std::fmt::Display;
use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use crm_core::storage::{ObjectStorage, StorageError};
use tokio::io::AsyncWriteExt;

/// Connection settings for [`S3Storage`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// AWS region, e.g. `eu-west-1`.
    pub region: String,
    /// Custom endpoint for S3-compatible servers (MinIO, LocalStack). Enables
    /// path-style addressing when set.
    pub endpoint: Option<String>,
}

/// [`ObjectStorage`] backed by the AWS SDK.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    /// Build a client from the default AWS credential chain and `settings`.
    pub async fn connect(settings: &S3Settings) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            region = %settings.region,
            endpoint = settings.endpoint.as_deref().unwrap_or("default"),
            "S3 client configured"
        );

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, bucket: &str, key: &str, source: &Path) -> Result<String, StorageError> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| transfer_error(bucket, key, e))?;

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| transfer_error(bucket, key, DisplayErrorContext(e)))?;

        let etag = output.e_tag().unwrap_or_default().to_string();
        tracing::info!(%bucket, %key, %etag, "Uploaded object");
        Ok(etag)
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    transfer_error(bucket, key, DisplayErrorContext(e))
                }
            })?;

        let content_length = output.content_length();
        let mut reader = output.body.into_async_read();
        let mut file = tokio::fs::File::create(destination).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        tracing::info!(%bucket, %key, ?content_length, written, "Downloaded object");
        Ok(written)
    }
}

fn transfer_error(bucket: &str, key: &str, err: impl Display) -> StorageError {
    StorageError::Transfer {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: err.to_string(),
    }
}

//! S3-compatible blob store (`aws-sdk-s3`).
//!
//! Works against AWS as well as MinIO/LocalStack when a custom endpoint is
//! configured (path-style addressing is forced in that case).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use tracing::instrument;

use super::{BlobStore, BlobStoreError, content_type_for};
use crate::config::S3Config;

/// `DeleteObjects` accepts at most this many keys per request.
const MAX_KEYS_PER_BATCH: usize = 1000;

#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    presign_expiration: Duration,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>, presign_expiration: Duration) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            presign_expiration,
        }
    }

    /// Build a client from the default AWS credential chain plus `config`.
    pub async fn from_config(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(
            Client::from_conf(builder.build()),
            config.bucket.clone(),
            config.presign_expiration,
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()), err)]
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(key, e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket), err)]
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(key, e))?;
        Ok(())
    }

    #[instrument(skip(self, keys), fields(bucket = %self.bucket, count = keys.len()), err)]
    async fn delete_many(&self, keys: &[String]) -> Result<(), BlobStoreError> {
        for chunk in keys.chunks(MAX_KEYS_PER_BATCH) {
            let objects = chunk
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|e| BlobStoreError::InvalidKey(format!("{key}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let payload = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| BlobStoreError::Transport(format!("build delete payload: {e}")))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(payload)
                .send()
                .await
                .map_err(|e| map_sdk_error("<batch>", e))?;

            // A key that is already gone counts as deleted.
            if let Some(failed) = output.errors().iter().find(|e| e.code() != Some("NoSuchKey")) {
                let key = failed.key().unwrap_or("<unknown>");
                return Err(match failed.code() {
                    Some("NoSuchBucket") => BlobStoreError::BucketNotFound,
                    _ => BlobStoreError::Transport(format!(
                        "delete {key}: {}",
                        failed.message().unwrap_or("unknown error")
                    )),
                });
            }
        }
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket), err)]
    async fn presigned_url(&self, key: &str) -> Result<String, BlobStoreError> {
        let presigning = PresigningConfig::expires_in(self.presign_expiration)
            .map_err(|e| BlobStoreError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| BlobStoreError::Presign(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

fn map_sdk_error<E, R>(key: &str, err: SdkError<E, R>) -> BlobStoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some("NoSuchBucket") => BlobStoreError::BucketNotFound,
        Some("NoSuchKey") | Some("NotFound") => BlobStoreError::ObjectNotFound(key.to_string()),
        _ => BlobStoreError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_from_config_without_network() {
        let store = S3BlobStore::from_config(&S3Config {
            bucket: "catalog-images".to_string(),
            region: Some("us-east-1".to_string()),
            endpoint: Some("http://localhost:4566".to_string()),
            presign_expiration: Duration::from_secs(60),
        })
        .await;

        assert_eq!(store.bucket(), "catalog-images");
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let store = S3BlobStore::from_config(&S3Config {
            bucket: "catalog-images".to_string(),
            region: Some("us-east-1".to_string()),
            endpoint: Some("http://127.0.0.1:9".to_string()),
            presign_expiration: Duration::from_secs(60),
        })
        .await;

        store.delete_many(&[]).await.unwrap();
    }
}

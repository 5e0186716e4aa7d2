//! Object storage used by the handler.
//!
//! The handler only needs four operations, so they are expressed as a small
//! trait. Production wires in [`S3Store`]; tests substitute an in-memory
//! store that records every call.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use lambda_runtime::tracing;

use crate::error::ArchiveError;

/// Outcome of a metadata-only existence probe.
///
/// Probe failures are folded into `NotFoundOrError` so callers never see an
/// error from the probe itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Existence {
    Found,
    NotFoundOrError,
}

#[async_trait]
pub(crate) trait ObjectStore: Send + Sync {
    /// Checks whether `key` exists without fetching its content.
    async fn exists(&self, bucket: &str, key: &str) -> Existence;

    /// Reads the full content of `key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ArchiveError>;

    /// Writes `body` to `key`, replacing anything already there.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ArchiveError>;

    /// Deletes `key`.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ArchiveError>;
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub(crate) struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub(crate) fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, bucket: &str, key: &str) -> Existence {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Existence::Found,
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_not_found()) {
                    tracing::debug!(bucket, key, "object not found");
                } else {
                    tracing::warn!(
                        bucket,
                        key,
                        error = %DisplayErrorContext(&err),
                        "existence probe failed, treating object as absent"
                    );
                }
                Existence::NotFoundOrError
            }
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ArchiveError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ArchiveError::storage("get_object", key, e))?;
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| ArchiveError::storage("get_object", key, e))?;
        Ok(body.into_bytes())
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ArchiveError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| ArchiveError::storage("put_object", key, e))?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ArchiveError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ArchiveError::storage("delete_object", key, e))?;
        Ok(())
    }
}

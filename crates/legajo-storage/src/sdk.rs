//! SDK-level object client backed by `object_store`'s S3 implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};

use crate::client::ObjectClient;
use crate::traits::{Authority, StorageError, StorageResult};

/// S3-compatible client via the object_store SDK.
#[derive(Clone)]
pub struct SdkObjectClient {
    store: AmazonS3,
    bucket: String,
    authority: Authority,
}

impl SdkObjectClient {
    /// Build a service-authority client from environment credentials plus
    /// explicit bucket/region settings.
    pub fn service(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        Self::build(bucket, region, endpoint_url, None, Authority::Service)
    }

    /// Build a caller-authority client from the invoking user's session
    /// token. Only constructed when a caller session is available.
    pub fn caller(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        session_token: String,
    ) -> StorageResult<Self> {
        Self::build(
            bucket,
            region,
            endpoint_url,
            Some(session_token),
            Authority::Caller,
        )
    }

    fn build(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        session_token: Option<String>,
        authority: Authority,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        if let Some(token) = session_token {
            builder = builder.with_token(token);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(SdkObjectClient {
            store,
            bucket,
            authority,
        })
    }
}

#[async_trait]
impl ObjectClient for SdkObjectClient {
    fn authority(&self) -> Authority {
        self.authority
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::warn!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                authority = %self.authority.as_str(),
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "SDK upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            authority = %self.authority.as_str(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "SDK upload successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::warn!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "SDK delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })
    }

    async fn signed_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }
}

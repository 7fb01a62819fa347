//! Raw HTTP object client.
//!
//! Writes straight to the storage REST endpoint with reqwest, bypassing the
//! SDK. Storage access policy occasionally rejects SDK write paths depending
//! on key-prefix rules, so the chain keeps this pathway as a late fallback.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::client::ObjectClient;
use crate::traits::{Authority, StorageError, StorageResult};

/// Characters escaped inside a key path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'?')
    .add(b'[')
    .add(b']');

/// Object client that talks to the storage REST endpoint directly.
#[derive(Clone)]
pub struct RestObjectClient {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    bearer_token: Option<String>,
    authority: Authority,
}

impl RestObjectClient {
    pub fn new(
        endpoint: String,
        bucket: String,
        bearer_token: Option<String>,
        authority: Authority,
    ) -> Self {
        RestObjectClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            bearer_token,
            authority,
        }
    }

    fn object_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect();
        format!("{}/{}/{}", self.endpoint, self.bucket, encoded.join("/"))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectClient for RestObjectClient {
    fn authority(&self) -> Authority {
        self.authority
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let url = self.object_url(key);
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        // Plain PUT overwrites; the chain stays idempotent per key.
        let response = self
            .authorize(self.http.put(&url))
            .header(http::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                key = %key,
                authority = %self.authority.as_str(),
                status = %status,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "REST upload failed"
            );
            return Err(StorageError::UploadFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&body, 200)
            )));
        }

        tracing::info!(
            key = %key,
            authority = %self.authority.as_str(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "REST upload successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let url = self.object_url(key);

        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if status == http::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(StorageError::DownloadFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let url = self.object_url(key);

        let response = self
            .authorize(self.http.delete(&url))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() && status != http::StatusCode::NOT_FOUND {
            return Err(StorageError::DeleteFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        Ok(())
    }

    async fn signed_put_url(
        &self,
        _key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        // URL signing requires the SDK credential chain.
        Err(StorageError::ConfigError(
            "signed URLs are not supported by the REST client".to_string(),
        ))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

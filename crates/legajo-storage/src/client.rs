//! Low-level object client seam.
//!
//! Both write pathways (SDK and raw REST) and both authorities (service and
//! caller) are expressed as `ObjectClient` implementations, so the strategy
//! chain can be assembled declaratively from whichever clients the
//! environment can construct.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::traits::{Authority, StorageResult};

#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Which credential this client writes under.
    fn authority(&self) -> Authority;

    /// Overwrite the object at `key`. All clients use upsert semantics.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Fetch the object at `key`.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete the object at `key`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Issue a time-limited URL a plain HTTP PUT can upload to.
    async fn signed_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

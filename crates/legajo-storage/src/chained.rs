//! `Storage` implementation that writes through the strategy chain and reads
//! through the service-authority client.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::client::ObjectClient;
use crate::strategy::UploadChain;
use crate::traits::{Storage, StorageResult, UploadReceipt};

pub struct ChainedStorage {
    chain: UploadChain,
    service: Arc<dyn ObjectClient>,
}

impl ChainedStorage {
    pub fn new(chain: UploadChain, service: Arc<dyn ObjectClient>) -> Self {
        ChainedStorage { chain, service }
    }
}

#[async_trait]
impl Storage for ChainedStorage {
    async fn upload(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<UploadReceipt> {
        self.chain.upload(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.service.get(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.service.delete(storage_key).await
    }
}

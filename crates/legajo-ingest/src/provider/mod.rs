//! External content provider interface.
//!
//! The import orchestrator reads from a third-party file/folder API through
//! this seam. Authentication uses a static credential distinct from any
//! end-user session.

pub mod drive;
pub mod reference;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use drive::DriveClient;
pub use reference::SourceRef;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Provider rejected credentials")]
    Unauthorized,

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Metadata for one provider item (file or folder).
#[derive(Debug, Clone)]
pub struct ProviderItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub is_folder: bool,
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Metadata lookup for a single item.
    async fn item_metadata(&self, id: &str) -> Result<ProviderItem, ProviderError>;

    /// Direct children of a folder (files and folders; callers filter).
    async fn list_children(&self, folder_id: &str) -> Result<Vec<ProviderItem>, ProviderError>;

    /// Byte download for an item.
    async fn download(&self, id: &str) -> Result<Bytes, ProviderError>;
}

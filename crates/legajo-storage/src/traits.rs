//! Storage abstraction trait
//!
//! Defines the `Storage` trait the orchestrators write through, the storage
//! error taxonomy, and the per-strategy failure record the upload chain
//! aggregates.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Which credential a client or strategy operates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Elevated system credential; the default write path.
    Service,
    /// The invoking user's own session; fallback when elevated strategies
    /// fail policy checks.
    Caller,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Service => "service",
            Authority::Caller => "caller",
        }
    }
}

/// One failed strategy attempt, kept for the caller-facing trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub reason: String,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy, self.reason)
    }
}

/// Join a failure trace into a single diagnostic line.
pub fn format_trace(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Successful upload: which strategy won, and what failed before it.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub strategy: &'static str,
    pub failures: Vec<StrategyFailure>,
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("All upload strategies failed: {}", format_trace(.failures))]
    AllStrategiesFailed { failures: Vec<StrategyFailure> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    /// The per-strategy trace when every write pathway was exhausted.
    pub fn strategy_trace(&self) -> Option<&[StrategyFailure]> {
        match self {
            StorageError::AllStrategiesFailed { failures } => Some(failures),
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction the orchestrators depend on.
///
/// Writes go through the strategy chain (upsert semantics at the object-key
/// level, so retries cannot create duplicate objects); reads and deletes use
/// the service-authority client directly.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload bytes to a specific storage key, trying each write strategy in
    /// order. Returns the winning strategy plus the failures that preceded it.
    async fn upload(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<UploadReceipt>;

    /// Download a blob by its storage key.
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Delete a blob by its storage key.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;
}

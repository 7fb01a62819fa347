//! Local batch upload orchestrator.
//!
//! Validates and uploads a set of user-selected files against a per-document
//! cap. Files are processed in fixed-size concurrent windows (bounded
//! concurrency, not full parallelism) so storage load stays limited while
//! I/O still overlaps; the orchestrator awaits each whole window before
//! advancing, which is also where cooperative cancellation is checked. One
//! item's failure never aborts the remaining batch.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use legajo_core::constants::{ALLOWED_CONTENT_TYPES, ALLOWED_EXTENSIONS};
use legajo_core::models::{BatchOutcome, ItemFailure};
use legajo_core::{naming, AppError, Config};
use legajo_storage::{keys, Storage};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::stores::FileStore;

/// One file selected for upload.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_files_per_document: i64,
    pub max_file_size_bytes: usize,
    pub window: usize,
}

impl From<&Config> for UploadLimits {
    fn from(config: &Config) -> Self {
        UploadLimits {
            max_files_per_document: config.max_files_per_document,
            max_file_size_bytes: config.max_file_size_bytes,
            window: config.upload_window,
        }
    }
}

pub struct LocalBatchUploader {
    storage: Arc<dyn Storage>,
    files: Arc<dyn FileStore>,
    limits: UploadLimits,
}

impl LocalBatchUploader {
    pub fn new(storage: Arc<dyn Storage>, files: Arc<dyn FileStore>, limits: UploadLimits) -> Self {
        LocalBatchUploader {
            storage,
            files,
            limits,
        }
    }

    /// Upload a batch of candidate files into one document.
    ///
    /// The per-document cap is enforced wholesale before any upload is
    /// attempted. Per-file validation failures, strategy-chain exhaustion,
    /// and metadata-insert failures are all item-local.
    pub async fn upload_batch(
        &self,
        document_id: Uuid,
        candidates: Vec<CandidateFile>,
        uploaded_by: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, AppError> {
        if candidates.is_empty() {
            return Ok(BatchOutcome::classify(0, Vec::new()));
        }

        let current = self.files.count_for_document(document_id).await?;
        if current + candidates.len() as i64 > self.limits.max_files_per_document {
            return Err(AppError::UsageLimitExceeded {
                resource: "files_per_document".to_string(),
                used: current,
                limit: self.limits.max_files_per_document,
            });
        }

        let total = candidates.len();
        let mut succeeded = 0usize;
        let mut failed: Vec<ItemFailure> = Vec::new();

        let mut remaining = candidates.into_iter();
        loop {
            let window: Vec<CandidateFile> =
                remaining.by_ref().take(self.limits.window).collect();
            if window.is_empty() {
                break;
            }

            if cancel.is_cancelled() {
                tracing::warn!(
                    document_id = %document_id,
                    completed = succeeded + failed.len(),
                    total,
                    "Batch upload cancelled between windows"
                );
                for candidate in window.into_iter().chain(remaining.by_ref()) {
                    failed.push(ItemFailure {
                        name: candidate.name,
                        reason: "cancelled".to_string(),
                    });
                }
                break;
            }

            let results = join_all(
                window
                    .into_iter()
                    .map(|candidate| self.upload_one(document_id, candidate, uploaded_by)),
            )
            .await;

            for result in results {
                match result {
                    Ok(()) => succeeded += 1,
                    Err(failure) => failed.push(failure),
                }
            }

            tracing::debug!(
                document_id = %document_id,
                completed = succeeded + failed.len(),
                total,
                "Batch window complete"
            );
        }

        let outcome = BatchOutcome::classify(succeeded, failed);
        tracing::info!(
            document_id = %document_id,
            result = ?outcome.result,
            succeeded = outcome.succeeded,
            failed = outcome.failed.len(),
            "Batch upload finished"
        );

        Ok(outcome)
    }

    fn validate(&self, candidate: &CandidateFile) -> Result<(), String> {
        if candidate.data.len() > self.limits.max_file_size_bytes {
            return Err(format!(
                "file exceeds maximum size of {} MB",
                self.limits.max_file_size_bytes / 1024 / 1024
            ));
        }

        let extension = candidate.name.rsplit('.').next().unwrap_or("").to_lowercase();
        if !candidate.name.contains('.') || !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(format!(
                "extension not allowed (allowed: {})",
                ALLOWED_EXTENSIONS.join(", ")
            ));
        }

        let mime = candidate
            .content_type
            .split(';')
            .next()
            .map(str::trim)
            .unwrap_or(&candidate.content_type)
            .to_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&mime.as_str()) {
            return Err(format!("content type {} not allowed", mime));
        }

        Ok(())
    }

    async fn upload_one(
        &self,
        document_id: Uuid,
        candidate: CandidateFile,
        uploaded_by: Option<Uuid>,
    ) -> Result<(), ItemFailure> {
        if let Err(reason) = self.validate(&candidate) {
            return Err(ItemFailure {
                name: candidate.name,
                reason,
            });
        }

        let safe_name = naming::safe_object_name(&candidate.name);
        let storage_key = keys::file_key(document_id, &safe_name);
        let byte_size = candidate.data.len() as i64;
        let extension = naming::safe_extension(&candidate.name).to_string();

        if let Err(e) = self
            .storage
            .upload(&storage_key, candidate.data.clone(), &candidate.content_type)
            .await
        {
            return Err(ItemFailure {
                name: candidate.name,
                reason: format!("storage_upload_failed: {}", e),
            });
        }

        match self
            .files
            .create_file(
                document_id,
                naming::display_slug(&candidate.name),
                storage_key.clone(),
                byte_size,
                extension,
                candidate.content_type.clone(),
                uploaded_by,
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                // A blob without a catalog row must not survive the batch.
                if let Err(cleanup_err) = self.storage.delete(&storage_key).await {
                    tracing::error!(
                        error = %cleanup_err,
                        storage_key = %storage_key,
                        "Failed to delete orphaned blob after metadata insert failure"
                    );
                }
                Err(ItemFailure {
                    name: candidate.name,
                    reason: format!("metadata_insert_failed: {}", e),
                })
            }
        }
    }
}

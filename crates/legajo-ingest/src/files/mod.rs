//! Mutating file operations guarded by the version engine.
//!
//! Delete and inline edit snapshot the current state first (warn-only), then
//! apply the mutation. Rollback is delegated to the engine, which snapshots
//! the pre-rollback state itself.

use std::sync::Arc;

use bytes::Bytes;
use legajo_core::models::{FileRecord, FileVersion, SnapshotReason};
use legajo_core::AppError;
use legajo_storage::Storage;
use uuid::Uuid;

use crate::stores::{FileStore, VersionStore};
use crate::versioning::VersionEngine;

pub struct FileService {
    storage: Arc<dyn Storage>,
    files: Arc<dyn FileStore>,
    versions: Arc<dyn VersionStore>,
    engine: Arc<VersionEngine>,
}

impl FileService {
    pub fn new(
        storage: Arc<dyn Storage>,
        files: Arc<dyn FileStore>,
        versions: Arc<dyn VersionStore>,
        engine: Arc<VersionEngine>,
    ) -> Self {
        FileService {
            storage,
            files,
            versions,
            engine,
        }
    }

    /// Delete a file record, its version history, and all associated blobs.
    ///
    /// Blob deletion is best-effort (an unreferenced object is cost-only);
    /// the metadata rows are the source of truth and their removal is what
    /// must succeed.
    pub async fn delete_file(&self, file_id: Uuid, actor: Option<Uuid>) -> Result<(), AppError> {
        let file = self
            .files
            .get_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", file_id)))?;

        self.engine
            .snapshot(&file, SnapshotReason::BeforeDelete, actor)
            .await;

        let versions = self.engine.list_versions(file_id).await?;
        for version in &versions {
            if let Err(e) = self.storage.delete(&version.storage_key).await {
                tracing::warn!(
                    file_id = %file_id,
                    version_no = version.version_no,
                    error = %e,
                    "Failed to delete version blob"
                );
            }
        }

        match self.versions.delete_for_file(file_id).await {
            Ok(_) => {}
            Err(e) if e.is_missing_schema() => {}
            Err(e) => return Err(e),
        }

        if let Err(e) = self.storage.delete(&file.storage_key).await {
            tracing::warn!(
                file_id = %file_id,
                storage_key = %file.storage_key,
                error = %e,
                "Failed to delete current blob"
            );
        }

        self.files.delete_file(file_id).await?;

        tracing::info!(
            file_id = %file_id,
            versions_removed = versions.len(),
            "File deleted"
        );

        Ok(())
    }

    /// Replace a file's content in place. The storage key is stable; only
    /// the blob and the size/type metadata change.
    pub async fn edit_file(
        &self,
        file_id: Uuid,
        data: Bytes,
        content_type: &str,
        actor: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        let file = self
            .files
            .get_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", file_id)))?;

        self.engine
            .snapshot(&file, SnapshotReason::BeforeInlineEdit, actor)
            .await;

        let byte_size = data.len() as i64;
        self.storage
            .upload(&file.storage_key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let updated = self
            .files
            .update_blob_metadata(
                file.id,
                byte_size,
                file.extension.clone(),
                content_type.to_string(),
            )
            .await?;

        Ok(updated)
    }

    /// Restore a prior version as the current blob.
    pub async fn rollback(
        &self,
        file_id: Uuid,
        version_no: i32,
        actor: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        self.engine.rollback(file_id, version_no, actor).await
    }

    /// Version history, newest first; empty when versioning is degraded.
    pub async fn list_versions(&self, file_id: Uuid) -> Result<Vec<FileVersion>, AppError> {
        self.engine.list_versions(file_id).await
    }
}

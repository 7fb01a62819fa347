//! Version snapshot & rollback engine.
//!
//! Before any mutating operation on an existing file, the engine captures the
//! current blob and metadata as an immutable version record. Version history
//! is a convenience, not a correctness requirement: snapshot failures are
//! warnings and never block the caller's delete/edit/rollback. When the
//! version schema is absent entirely (table or column not provisioned), the
//! engine latches into degraded mode and every later snapshot becomes a
//! warning no-op.
//!
//! The degraded flag is engine-local state threaded through the constructor,
//! not a module-level global, so independent engines in one process cannot
//! race on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use legajo_core::models::{FileRecord, FileVersion, SnapshotReason};
use legajo_core::AppError;
use legajo_storage::{keys, Storage};
use uuid::Uuid;

pub struct VersionEngine {
    storage: Arc<dyn Storage>,
    files: Arc<dyn crate::stores::FileStore>,
    versions: Arc<dyn crate::stores::VersionStore>,
    enabled: AtomicBool,
}

impl VersionEngine {
    /// `versioning_enabled` comes from configuration; the engine may further
    /// degrade itself at runtime when the schema turns out to be missing.
    pub fn new(
        storage: Arc<dyn Storage>,
        files: Arc<dyn crate::stores::FileStore>,
        versions: Arc<dyn crate::stores::VersionStore>,
        versioning_enabled: bool,
    ) -> Self {
        VersionEngine {
            storage,
            files,
            versions,
            enabled: AtomicBool::new(versioning_enabled),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.enabled.load(Ordering::Relaxed)
    }

    /// Snapshot the file's current blob and metadata. Never fails the caller:
    /// returns the new version on success, `None` (with a warning) otherwise.
    pub async fn snapshot(
        &self,
        file: &FileRecord,
        reason: SnapshotReason,
        actor: Option<Uuid>,
    ) -> Option<FileVersion> {
        if self.is_degraded() {
            tracing::warn!(
                file_id = %file.id,
                reason = %reason,
                "Versioning degraded, proceeding without snapshot"
            );
            return None;
        }

        match self.try_snapshot(file, reason, actor).await {
            Ok(version) => {
                tracing::info!(
                    file_id = %file.id,
                    version_no = version.version_no,
                    reason = %reason,
                    "Snapshot created"
                );
                Some(version)
            }
            Err(e) if e.is_missing_schema() => {
                self.enabled.store(false, Ordering::Relaxed);
                tracing::warn!(
                    file_id = %file.id,
                    error = %e,
                    "Version schema missing, versioning disabled for this engine"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    file_id = %file.id,
                    reason = %reason,
                    error = %e,
                    "Snapshot failed, proceeding without"
                );
                None
            }
        }
    }

    async fn try_snapshot(
        &self,
        file: &FileRecord,
        reason: SnapshotReason,
        actor: Option<Uuid>,
    ) -> Result<FileVersion, AppError> {
        let data = self
            .storage
            .download(&file.storage_key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        // Fresh random name per snapshot; the timestamp alone is not unique
        // across rapid successive mutations of the same file.
        let safe_name = format!("{}.{}", Uuid::new_v4(), file.extension);
        let snapshot_key = keys::version_key(
            file.document_id,
            file.id,
            Utc::now().timestamp(),
            &safe_name,
        );

        self.storage
            .upload(&snapshot_key, data, &file.mime_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        self.versions
            .insert_snapshot(
                file.id,
                snapshot_key,
                file.byte_size,
                file.extension.clone(),
                file.mime_type.clone(),
                reason.code(),
                actor,
            )
            .await
    }

    /// Restore a prior version as the current blob.
    ///
    /// The pre-rollback state is snapshotted first (warn-only), so a rollback
    /// is itself reversible. Failures past that point are fatal to the
    /// rollback request only; the file is left in its pre-rollback state.
    pub async fn rollback(
        &self,
        file_id: Uuid,
        version_no: i32,
        actor: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        let file = self
            .files
            .get_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", file_id)))?;

        let target = self
            .versions
            .get_version(file_id, version_no)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("version {} of file {}", version_no, file_id))
            })?;

        self.snapshot(&file, SnapshotReason::BeforeRollbackTo(version_no), actor)
            .await;

        let data = self
            .storage
            .download(&target.storage_key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        // Overwrite in place: the file's storage key does not change.
        self.storage
            .upload(&file.storage_key, data, &target.mime_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let restored = self
            .files
            .update_blob_metadata(
                file.id,
                target.byte_size,
                target.extension.clone(),
                target.mime_type.clone(),
            )
            .await?;

        tracing::info!(
            file_id = %file_id,
            restored_version = version_no,
            "Rollback complete"
        );

        Ok(restored)
    }

    /// Version history, newest first. Empty in degraded mode rather than an
    /// error, so callers can render an empty history.
    pub async fn list_versions(&self, file_id: Uuid) -> Result<Vec<FileVersion>, AppError> {
        if self.is_degraded() {
            return Ok(Vec::new());
        }

        match self.versions.list_versions(file_id).await {
            Ok(versions) => Ok(versions),
            Err(e) if e.is_missing_schema() => {
                self.enabled.store(false, Ordering::Relaxed);
                tracing::warn!(
                    file_id = %file_id,
                    "Version schema missing, returning empty history"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

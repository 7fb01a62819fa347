//! External bulk import orchestrator.
//!
//! Reconciles three independently-failing systems (the external content
//! provider, blob storage, and the catalog metadata store) without a
//! distributed transaction. Items are processed strictly sequentially so
//! failure attribution stays item-local and the provider's rate limits are
//! respected. On any step failure the resources created for that item only
//! (fresh document row, uploaded blob) are rolled back best-effort, the item
//! is counted as skipped with a structured reason, and the loop continues.
//!
//! Every run is keyed by a generated run identifier threaded through trace
//! logs, the run's audit entry, and the caller-facing report.

use std::sync::Arc;

use legajo_core::constants::{MAX_SKIP_SAMPLES, MAX_TRACE_ENTRIES};
use legajo_core::models::{ImportMode, ImportReport, ImportTarget};
use legajo_core::{naming, AppError};
use legajo_storage::{format_trace, keys, Storage, StorageError};
use uuid::Uuid;

use crate::provider::{reference, ContentProvider, ProviderItem, SourceRef};
use crate::stores::{AuditSink, DocumentStore, FileStore};

/// Bounded log of operational milestones for one run. Entries mirror to
/// tracing as they are recorded.
struct RunTrace {
    run_id: Uuid,
    entries: Vec<String>,
}

impl RunTrace {
    fn new(run_id: Uuid) -> Self {
        RunTrace {
            run_id,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, entry: String) {
        tracing::info!(run_id = %self.run_id, "{}", entry);
        if self.entries.len() < MAX_TRACE_ENTRIES {
            self.entries.push(entry);
        }
    }
}

enum ResolvedTarget {
    /// Files append to this existing (or freshly materialized) document.
    Existing(Uuid),
    /// One new document is created per imported item inside this section.
    PerItem { section_id: Uuid },
}

pub struct BulkImporter {
    provider: Arc<dyn ContentProvider>,
    storage: Arc<dyn Storage>,
    documents: Arc<dyn DocumentStore>,
    files: Arc<dyn FileStore>,
    audit: Arc<dyn AuditSink>,
}

impl BulkImporter {
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        storage: Arc<dyn Storage>,
        documents: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        BulkImporter {
            provider,
            storage,
            documents,
            files,
            audit,
        }
    }

    /// Run one import. Input-validation failures reject before any network
    /// call; provider/storage/metadata failures during the item loop are
    /// item-local. The report (with run id and trace) is returned even when
    /// every item was skipped.
    pub async fn import(
        &self,
        source: &str,
        target: ImportTarget,
        mode: ImportMode,
        actor: Option<Uuid>,
    ) -> Result<ImportReport, AppError> {
        let run_id = Uuid::new_v4();
        let mut trace = RunTrace::new(run_id);

        let source_ref = reference::classify(source)?;
        if source_ref.is_folder() && mode == ImportMode::FileOnly {
            return Err(AppError::InvalidInput(
                "folder reference not allowed for file-only import".to_string(),
            ));
        }
        trace.push(format!(
            "classified source as {}",
            if source_ref.is_folder() { "folder" } else { "file" }
        ));

        let items = self.resolve_listing(&source_ref, mode).await?;
        let scanned = items.len();
        trace.push(format!("scanned {} items", scanned));

        let resolved = self
            .resolve_target(target, &source_ref, actor, &mut trace)
            .await?;

        let mut imported = 0usize;
        let mut skipped = 0usize;
        let mut samples: Vec<String> = Vec::new();

        for item in &items {
            match self.import_one(item, &resolved, actor, &mut trace).await {
                Ok(()) => imported += 1,
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!(
                        run_id = %run_id,
                        item = %item.name,
                        reason = %reason,
                        "Import item skipped"
                    );
                    if samples.len() < MAX_SKIP_SAMPLES {
                        samples.push(format!("{}: {}", item.name, reason));
                    }
                }
            }
        }

        trace.push(format!(
            "run complete: imported={} skipped={}",
            imported, skipped
        ));

        // One audit entry per run. Best-effort: the work is already done, so
        // a failed audit write is traced rather than failing the run.
        let detail = serde_json::json!({
            "run_id": run_id,
            "source": source,
            "scanned": scanned,
            "imported": imported,
            "skipped": skipped,
            "skipped_samples": samples,
        });
        if let Err(e) = self.audit.append(actor, "external_import", detail).await {
            trace.push(format!("audit_write_failed: {}", e));
        }

        Ok(ImportReport {
            run_id,
            scanned,
            imported,
            skipped,
            skipped_samples: samples,
            trace: trace.entries,
        })
    }

    async fn resolve_listing(
        &self,
        source_ref: &SourceRef,
        mode: ImportMode,
    ) -> Result<Vec<ProviderItem>, AppError> {
        match source_ref {
            SourceRef::File(id) => {
                let item = self
                    .provider
                    .item_metadata(id)
                    .await
                    .map_err(|e| AppError::Provider(e.to_string()))?;
                if item.is_folder {
                    // A bare identifier can turn out to be a folder; only the
                    // metadata lookup can tell.
                    if mode == ImportMode::FileOnly {
                        return Err(AppError::InvalidInput(
                            "reference resolves to a folder, but only file import is permitted"
                                .to_string(),
                        ));
                    }
                    self.list_folder(&item.id).await
                } else {
                    Ok(vec![item])
                }
            }
            SourceRef::Folder(id) => self.list_folder(id).await,
        }
    }

    async fn list_folder(&self, folder_id: &str) -> Result<Vec<ProviderItem>, AppError> {
        let children = self
            .provider
            .list_children(folder_id)
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;
        Ok(children.into_iter().filter(|c| !c.is_folder).collect())
    }

    async fn resolve_target(
        &self,
        target: ImportTarget,
        source_ref: &SourceRef,
        actor: Option<Uuid>,
        trace: &mut RunTrace,
    ) -> Result<ResolvedTarget, AppError> {
        match target {
            ImportTarget::Document(id) => {
                self.documents
                    .get_document(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("document {}", id)))?;
                Ok(ResolvedTarget::Existing(id))
            }
            ImportTarget::Section { section_id } => Ok(ResolvedTarget::PerItem { section_id }),
            ImportTarget::NewSubfolder { section_id, name } => {
                let name = match name {
                    Some(name) => name,
                    None => self.source_folder_name(source_ref).await,
                };
                let document = self
                    .documents
                    .create_document(section_id, name, actor)
                    .await?;
                trace.push(format!("created import target document {}", document.id));
                Ok(ResolvedTarget::Existing(document.id))
            }
        }
    }

    /// Name a materialized import target after the source folder when the
    /// caller did not supply one.
    async fn source_folder_name(&self, source_ref: &SourceRef) -> String {
        if let SourceRef::Folder(id) = source_ref {
            match self.provider.item_metadata(id).await {
                Ok(item) => return item.name,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not resolve source folder name");
                }
            }
        }
        "Imported files".to_string()
    }

    async fn import_one(
        &self,
        item: &ProviderItem,
        target: &ResolvedTarget,
        actor: Option<Uuid>,
        trace: &mut RunTrace,
    ) -> Result<(), String> {
        let data = self
            .provider
            .download(&item.id)
            .await
            .map_err(|e| format!("provider_download_failed: {}", e))?;

        let (document_id, created_document) = match target {
            ResolvedTarget::Existing(id) => (*id, None),
            ResolvedTarget::PerItem { section_id } => {
                let document = self
                    .documents
                    .create_document(*section_id, item.name.clone(), actor)
                    .await
                    .map_err(|e| format!("document_create_failed: {}", e))?;
                (document.id, Some(document.id))
            }
        };

        let safe_name = naming::safe_object_name(&item.name);
        let storage_key = keys::file_key(document_id, &safe_name);
        let byte_size = data.len() as i64;

        let receipt = match self.storage.upload(&storage_key, data, &item.mime_type).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.rollback_item(created_document, None, trace).await;
                let reason = match &e {
                    StorageError::AllStrategiesFailed { failures } => format!(
                        "storage_upload_failed: {} | path={}",
                        format_trace(failures),
                        storage_key
                    ),
                    other => format!("storage_upload_failed: {} | path={}", other, storage_key),
                };
                return Err(reason);
            }
        };

        if !receipt.failures.is_empty() {
            trace.push(format!(
                "upload_fallback: {} | strategy={} | path={}",
                format_trace(&receipt.failures),
                receipt.strategy,
                storage_key
            ));
        }

        match self
            .files
            .create_file(
                document_id,
                naming::display_slug(&item.name),
                storage_key.clone(),
                byte_size,
                naming::safe_extension(&item.name).to_string(),
                item.mime_type.clone(),
                actor,
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                self.rollback_item(created_document, Some(&storage_key), trace)
                    .await;
                Err(format!("metadata_insert_failed: {}", e))
            }
        }
    }

    /// Best-effort compensation for one failed item: remove the uploaded
    /// blob and the document row created for it. Compensation failures are
    /// traced, never escalated; an orphan blob is unreferenced and harmless.
    async fn rollback_item(
        &self,
        created_document: Option<Uuid>,
        blob_key: Option<&str>,
        trace: &mut RunTrace,
    ) {
        if let Some(key) = blob_key {
            if let Err(e) = self.storage.delete(key).await {
                trace.push(format!("compensation_failed: blob {} ({})", key, e));
            }
        }
        if let Some(document_id) = created_document {
            if let Err(e) = self.documents.delete_document(document_id).await {
                trace.push(format!(
                    "compensation_failed: document {} ({})",
                    document_id, e
                ));
            }
        }
    }
}

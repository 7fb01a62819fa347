//! In-memory fakes for the metadata store, blob storage, and content
//! provider, so orchestrator behavior can be exercised without Postgres or a
//! real bucket.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use legajo_core::models::{Document, FileRecord, FileVersion};
use legajo_core::AppError;
use legajo_ingest::provider::{ContentProvider, ProviderError, ProviderItem};
use legajo_ingest::stores::{AuditSink, DocumentStore, FileStore, VersionStore};
use legajo_storage::{
    Storage, StorageError, StorageResult, StrategyFailure, UploadReceipt,
};

/// Blob store fake. Uploads succeed unless `fail_all` is set or the payload
/// equals `poison` (lets a test fail one specific candidate without knowing
/// its randomized key).
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub fail_all: AtomicBool,
    pub poison: Mutex<Option<Bytes>>,
    pub uploads: AtomicUsize,
    pub downloads: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, data: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::copy_from_slice(data));
        self
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn exhausted() -> StorageError {
        StorageError::AllStrategiesFailed {
            failures: vec![
                StrategyFailure {
                    strategy: "signed_url",
                    reason: "403 policy rejection".to_string(),
                },
                StrategyFailure {
                    strategy: "sdk_service",
                    reason: "403 policy rejection".to_string(),
                },
                StrategyFailure {
                    strategy: "rest_service",
                    reason: "403 policy rejection".to_string(),
                },
            ],
        }
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn upload(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<UploadReceipt> {
        self.uploads.fetch_add(1, Ordering::SeqCst);

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(Self::exhausted());
        }
        if let Some(ref poison) = *self.poison.lock().unwrap() {
            if *poison == data {
                return Err(Self::exhausted());
            }
        }

        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);

        Ok(UploadReceipt {
            strategy: "signed_url",
            failures: Vec::new(),
        })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }
}

/// File-record store fake. `base_counts` simulates pre-existing files that
/// are not materialized as rows; `fail_creates` makes every insert fail for
/// compensation tests.
#[derive(Default)]
pub struct MemFileStore {
    pub files: Mutex<HashMap<Uuid, FileRecord>>,
    pub base_counts: Mutex<HashMap<Uuid, i64>>,
    pub fail_creates: AtomicBool,
    pub create_attempts: AtomicUsize,
}

impl MemFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_existing_count(&self, document_id: Uuid, count: i64) {
        self.base_counts.lock().unwrap().insert(document_id, count);
    }

    pub fn insert_fixture(&self, file: FileRecord) {
        self.files.lock().unwrap().insert(file.id, file);
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<FileRecord> {
        self.files.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl FileStore for MemFileStore {
    async fn create_file(
        &self,
        document_id: Uuid,
        display_name: String,
        storage_key: String,
        byte_size: i64,
        extension: String,
        mime_type: String,
        uploaded_by: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert rejected".to_string()));
        }

        let file = FileRecord {
            id: Uuid::new_v4(),
            document_id,
            display_name,
            storage_key,
            byte_size,
            extension,
            mime_type,
            uploaded_by,
            created_at: Utc::now(),
        };
        self.files.lock().unwrap().insert(file.id, file.clone());
        Ok(file)
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self.files.lock().unwrap().get(&id).cloned())
    }

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64, AppError> {
        let base = self
            .base_counts
            .lock()
            .unwrap()
            .get(&document_id)
            .copied()
            .unwrap_or(0);
        let live = self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.document_id == document_id)
            .count() as i64;
        Ok(base + live)
    }

    async fn update_blob_metadata(
        &self,
        id: Uuid,
        byte_size: i64,
        extension: String,
        mime_type: String,
    ) -> Result<FileRecord, AppError> {
        let mut files = self.files.lock().unwrap();
        let file = files
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("file {}", id)))?;
        file.byte_size = byte_size;
        file.extension = extension;
        file.mime_type = mime_type;
        Ok(file.clone())
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), AppError> {
        self.files.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Version store fake with the same max+1 numbering contract as the real
/// repository.
#[derive(Default)]
pub struct MemVersionStore {
    pub versions: Mutex<Vec<FileVersion>>,
    pub fail_inserts: AtomicBool,
    pub insert_attempts: AtomicUsize,
}

impl MemVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<FileVersion> {
        self.versions.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionStore for MemVersionStore {
    async fn insert_snapshot(
        &self,
        file_id: Uuid,
        storage_key: String,
        byte_size: i64,
        extension: String,
        mime_type: String,
        reason: String,
        created_by: Option<Uuid>,
    ) -> Result<FileVersion, AppError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert rejected".to_string()));
        }

        let mut versions = self.versions.lock().unwrap();
        let next = versions
            .iter()
            .filter(|v| v.file_id == file_id)
            .map(|v| v.version_no)
            .max()
            .unwrap_or(0)
            + 1;
        let version = FileVersion {
            id: Uuid::new_v4(),
            file_id,
            version_no: next,
            storage_key,
            byte_size,
            extension,
            mime_type,
            reason,
            created_by,
            created_at: Utc::now(),
        };
        versions.push(version.clone());
        Ok(version)
    }

    async fn get_version(
        &self,
        file_id: Uuid,
        version_no: i32,
    ) -> Result<Option<FileVersion>, AppError> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.file_id == file_id && v.version_no == version_no)
            .cloned())
    }

    async fn list_versions(&self, file_id: Uuid) -> Result<Vec<FileVersion>, AppError> {
        let mut versions: Vec<FileVersion> = self
            .versions
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.file_id == file_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_no.cmp(&a.version_no));
        Ok(versions)
    }

    async fn delete_for_file(&self, file_id: Uuid) -> Result<u64, AppError> {
        let mut versions = self.versions.lock().unwrap();
        let before = versions.len();
        versions.retain(|v| v.file_id != file_id);
        Ok((before - versions.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemDocumentStore {
    pub documents: Mutex<HashMap<Uuid, Document>>,
    pub deleted: Mutex<Vec<Uuid>>,
    pub created: AtomicUsize,
}

impl MemDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, id: Uuid) -> Self {
        self.documents.lock().unwrap().insert(
            id,
            Document {
                id,
                section_id: Uuid::new_v4(),
                name: "existing".to_string(),
                created_by: None,
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn deleted_ids(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemDocumentStore {
    async fn create_document(
        &self,
        section_id: Uuid,
        name: String,
        created_by: Option<Uuid>,
    ) -> Result<Document, AppError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let document = Document {
            id: Uuid::new_v4(),
            section_id,
            name,
            created_by,
            created_at: Utc::now(),
        };
        self.documents
            .lock()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self.documents.lock().unwrap().get(&id).cloned())
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), AppError> {
        self.documents.lock().unwrap().remove(&id);
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemAuditSink {
    pub entries: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MemAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, serde_json::Value)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemAuditSink {
    async fn append(
        &self,
        _actor: Option<Uuid>,
        action: &str,
        detail: serde_json::Value,
    ) -> Result<(), AppError> {
        self.entries
            .lock()
            .unwrap()
            .push((action.to_string(), detail));
        Ok(())
    }
}

/// Content provider fake with call counters, so tests can assert that
/// rejected references cause zero network calls.
#[derive(Default)]
pub struct FakeProvider {
    pub items: Mutex<HashMap<String, ProviderItem>>,
    pub children: Mutex<HashMap<String, Vec<ProviderItem>>>,
    pub data: Mutex<HashMap<String, Bytes>>,
    pub fail_downloads: Mutex<HashSet<String>>,
    pub metadata_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, id: &str, name: &str, mime_type: &str, data: &[u8]) -> Self {
        self.items.lock().unwrap().insert(
            id.to_string(),
            ProviderItem {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                is_folder: false,
            },
        );
        self.data
            .lock()
            .unwrap()
            .insert(id.to_string(), Bytes::copy_from_slice(data));
        self
    }

    pub fn with_folder(self, id: &str, name: &str, child_ids: &[&str]) -> Self {
        {
            let items = self.items.lock().unwrap();
            let children: Vec<ProviderItem> = child_ids
                .iter()
                .filter_map(|cid| items.get(*cid).cloned())
                .collect();
            self.children
                .lock()
                .unwrap()
                .insert(id.to_string(), children);
        }
        self.items.lock().unwrap().insert(
            id.to_string(),
            ProviderItem {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: "application/vnd.google-apps.folder".to_string(),
                is_folder: true,
            },
        );
        self
    }

    pub fn fail_download(&self, id: &str) {
        self.fail_downloads.lock().unwrap().insert(id.to_string());
    }

    pub fn total_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
            + self.list_calls.load(Ordering::SeqCst)
            + self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for FakeProvider {
    async fn item_metadata(&self, id: &str) -> Result<ProviderItem, ProviderError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.items
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<ProviderItem>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.children
            .lock()
            .unwrap()
            .get(folder_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(folder_id.to_string()))
    }

    async fn download(&self, id: &str) -> Result<Bytes, ProviderError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_downloads.lock().unwrap().contains(id) {
            return Err(ProviderError::Request("connection reset".to_string()));
        }
        self.data
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

/// A file record fixture whose blob lives at `{document_id}/{uuid}.pdf`.
pub fn file_fixture(document_id: Uuid, byte_size: i64) -> FileRecord {
    let id = Uuid::new_v4();
    FileRecord {
        id,
        document_id,
        display_name: "informe.pdf".to_string(),
        storage_key: format!("{}/{}.pdf", document_id, Uuid::new_v4()),
        byte_size,
        extension: "pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        uploaded_by: None,
        created_at: Utc::now(),
    }
}

mod helpers;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use helpers::{FakeProvider, FakeStorage, MemAuditSink, MemDocumentStore, MemFileStore};
use legajo_core::models::{ImportMode, ImportTarget};
use legajo_core::AppError;
use legajo_ingest::BulkImporter;
use legajo_storage::{
    Authority, ChainedStorage, ObjectClient, Storage, StorageError, StorageResult, UploadChain,
    UploadStrategy,
};

fn importer(
    provider: Arc<FakeProvider>,
    storage: Arc<dyn Storage>,
    documents: Arc<MemDocumentStore>,
    files: Arc<MemFileStore>,
    audit: Arc<MemAuditSink>,
) -> BulkImporter {
    BulkImporter::new(provider, storage, documents, files, audit)
}

#[tokio::test]
async fn single_file_import_into_existing_document() {
    let document_id = uuid::Uuid::new_v4();
    let provider = Arc::new(FakeProvider::new().with_file(
        "1AbCdEfGhIjKl",
        "acta.pdf",
        "application/pdf",
        b"pdf-bytes",
    ));
    let storage = Arc::new(FakeStorage::new());
    let documents = Arc::new(MemDocumentStore::new().with_document(document_id));
    let files = Arc::new(MemFileStore::new());
    let audit = Arc::new(MemAuditSink::new());

    let report = importer(
        provider,
        storage.clone(),
        documents,
        files.clone(),
        audit.clone(),
    )
    .import(
        "1AbCdEfGhIjKl",
        ImportTarget::Document(document_id),
        ImportMode::FileOnly,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.scanned, 1);
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 0);
    assert!(report.skipped_samples.is_empty());

    assert_eq!(files.len(), 1);
    let stored = storage.keys_with_prefix(&format!("{}/", document_id));
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with(".pdf"));

    // One audit entry per run, correlated by run id.
    let entries = audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "external_import");
    assert_eq!(entries[0].1["imported"], 1);
    assert_eq!(entries[0].1["run_id"], report.run_id.to_string());
}

/// Strategy fake with a scripted outcome; a succeeding one writes into the
/// shared object map so the blob is observable.
struct ScriptedStrategy {
    name: &'static str,
    fail: bool,
    sink: Arc<Mutex<HashMap<String, Bytes>>>,
}

#[async_trait]
impl UploadStrategy for ScriptedStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self, key: &str, data: &Bytes, _content_type: &str) -> StorageResult<()> {
        if self.fail {
            return Err(StorageError::UploadFailed("403 policy rejection".to_string()));
        }
        self.sink.lock().unwrap().insert(key.to_string(), data.clone());
        Ok(())
    }
}

/// Minimal service client for the read/delete side of `ChainedStorage`.
struct MemObjectClient {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
}

#[async_trait]
impl ObjectClient for MemObjectClient {
    fn authority(&self) -> Authority {
        Authority::Service
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn signed_put_url(
        &self,
        _key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::ConfigError("unsupported".to_string()))
    }
}

#[tokio::test]
async fn fallback_strategies_are_traced_but_import_succeeds() {
    let document_id = uuid::Uuid::new_v4();
    let objects: Arc<Mutex<HashMap<String, Bytes>>> = Arc::new(Mutex::new(HashMap::new()));

    // First two strategies fail policy checks; the third succeeds.
    let chain = UploadChain::new(vec![
        Arc::new(ScriptedStrategy {
            name: "signed_url",
            fail: true,
            sink: objects.clone(),
        }),
        Arc::new(ScriptedStrategy {
            name: "sdk_service",
            fail: true,
            sink: objects.clone(),
        }),
        Arc::new(ScriptedStrategy {
            name: "sdk_caller",
            fail: false,
            sink: objects.clone(),
        }),
    ]);
    let storage: Arc<dyn Storage> = Arc::new(ChainedStorage::new(
        chain,
        Arc::new(MemObjectClient {
            objects: objects.clone(),
        }),
    ));

    let provider = Arc::new(FakeProvider::new().with_file(
        "1AbCdEfGhIjKl",
        "acta.pdf",
        "application/pdf",
        b"pdf-bytes",
    ));
    let documents = Arc::new(MemDocumentStore::new().with_document(document_id));
    let files = Arc::new(MemFileStore::new());
    let audit = Arc::new(MemAuditSink::new());

    let report = importer(provider, storage, documents, files.clone(), audit)
        .import(
            "1AbCdEfGhIjKl",
            ImportTarget::Document(document_id),
            ImportMode::FileOnly,
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(files.len(), 1);
    assert_eq!(objects.lock().unwrap().len(), 1);

    // The trace lists exactly the two failed attempts, not the winner.
    let fallback = report
        .trace
        .iter()
        .find(|e| e.starts_with("upload_fallback:"))
        .expect("fallback trace entry");
    assert!(fallback.contains("signed_url=403 policy rejection"));
    assert!(fallback.contains("sdk_service=403 policy rejection"));
    assert!(!fallback.contains("sdk_caller="));
    assert!(fallback.contains("strategy=sdk_caller"));
}

#[tokio::test]
async fn folder_reference_is_rejected_for_file_only_import_without_network() {
    let provider = Arc::new(FakeProvider::new());
    let storage = Arc::new(FakeStorage::new());
    let documents = Arc::new(MemDocumentStore::new());
    let files = Arc::new(MemFileStore::new());
    let audit = Arc::new(MemAuditSink::new());

    let err = importer(
        provider.clone(),
        storage.clone(),
        documents,
        files,
        audit.clone(),
    )
    .import(
        "https://drive.google.com/drive/folders/FFFFFolder01",
        ImportTarget::Document(uuid::Uuid::new_v4()),
        ImportMode::FileOnly,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    // Rejected purely from the reference's shape.
    assert_eq!(provider.total_calls(), 0);
    assert_eq!(storage.uploads.load(Ordering::SeqCst), 0);
    assert!(audit.entries().is_empty());
}

#[tokio::test]
async fn folder_import_rolls_back_only_the_failed_item() {
    let section_id = uuid::Uuid::new_v4();
    let provider = Arc::new(
        FakeProvider::new()
            .with_file("file0000001", "uno.pdf", "application/pdf", b"uno-bytes")
            .with_file("file0000002", "dos.pdf", "application/pdf", b"dos-bytes")
            .with_folder("FFFFFolder01", "Carpeta 2024", &["file0000001", "file0000002"]),
    );
    let storage = Arc::new(FakeStorage::new());
    // Fail every storage strategy for the second item's payload only.
    *storage.poison.lock().unwrap() = Some(Bytes::from_static(b"dos-bytes"));
    let documents = Arc::new(MemDocumentStore::new());
    let files = Arc::new(MemFileStore::new());
    let audit = Arc::new(MemAuditSink::new());

    let report = importer(
        provider,
        storage.clone(),
        documents.clone(),
        files.clone(),
        audit.clone(),
    )
    .import(
        "https://drive.google.com/drive/folders/FFFFFolder01",
        ImportTarget::Section { section_id },
        ImportMode::FileOrFolder,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);

    // Structured skip reason with the strategy trace and the attempted key.
    assert_eq!(report.skipped_samples.len(), 1);
    let sample = &report.skipped_samples[0];
    assert!(sample.starts_with("dos.pdf: storage_upload_failed:"));
    assert!(sample.contains("signed_url=403"));
    assert!(sample.contains("| path="));

    // Both items got a document; the failed item's was rolled back.
    assert_eq!(documents.created.load(Ordering::SeqCst), 2);
    assert_eq!(documents.deleted_ids().len(), 1);
    assert_eq!(documents.documents.lock().unwrap().len(), 1);
    assert_eq!(files.len(), 1);

    // The loop continued after the failure and the run was audited once.
    let entries = audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1["skipped"], 1);
}

#[tokio::test]
async fn metadata_insert_failure_compensates_blob_and_document() {
    let section_id = uuid::Uuid::new_v4();
    let provider = Arc::new(FakeProvider::new().with_file(
        "file0000001",
        "uno.pdf",
        "application/pdf",
        b"uno-bytes",
    ));
    let storage = Arc::new(FakeStorage::new());
    let documents = Arc::new(MemDocumentStore::new());
    let files = Arc::new(MemFileStore::new());
    files.fail_creates.store(true, Ordering::SeqCst);
    let audit = Arc::new(MemAuditSink::new());

    let report = importer(
        provider,
        storage.clone(),
        documents.clone(),
        files.clone(),
        audit,
    )
    .import(
        "file0000001",
        ImportTarget::Section { section_id },
        ImportMode::FileOnly,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 1);
    assert!(report.skipped_samples[0].contains("metadata_insert_failed"));

    // Blob and fresh document row are both gone.
    assert!(storage.objects.lock().unwrap().is_empty());
    assert_eq!(documents.deleted_ids().len(), 1);
    assert!(documents.documents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn new_subfolder_mode_groups_all_items_under_one_document() {
    let section_id = uuid::Uuid::new_v4();
    let provider = Arc::new(
        FakeProvider::new()
            .with_file("file0000001", "uno.pdf", "application/pdf", b"uno-bytes")
            .with_file("file0000002", "dos.csv", "text/csv", b"dos-bytes")
            .with_folder("FFFFFolder01", "Carpeta 2024", &["file0000001", "file0000002"]),
    );
    let storage = Arc::new(FakeStorage::new());
    let documents = Arc::new(MemDocumentStore::new());
    let files = Arc::new(MemFileStore::new());
    let audit = Arc::new(MemAuditSink::new());

    let report = importer(
        provider,
        storage,
        documents.clone(),
        files.clone(),
        audit,
    )
    .import(
        "https://drive.google.com/drive/folders/FFFFFolder01",
        ImportTarget::NewSubfolder {
            section_id,
            name: None,
        },
        ImportMode::FileOrFolder,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.imported, 2);

    // Exactly one document, named after the source folder.
    assert_eq!(documents.created.load(Ordering::SeqCst), 1);
    let docs = documents.documents.lock().unwrap();
    let target = docs.values().next().unwrap();
    assert_eq!(target.name, "Carpeta 2024");
    assert_eq!(target.section_id, section_id);

    let files = files.files.lock().unwrap();
    assert!(files.values().all(|f| f.document_id == target.id));
}

#[tokio::test]
async fn empty_folder_yields_empty_report_with_audit() {
    let section_id = uuid::Uuid::new_v4();
    let provider = Arc::new(FakeProvider::new().with_folder("FFFFFolder01", "Vacía", &[]));
    let storage = Arc::new(FakeStorage::new());
    let documents = Arc::new(MemDocumentStore::new());
    let files = Arc::new(MemFileStore::new());
    let audit = Arc::new(MemAuditSink::new());

    let report = importer(provider, storage, documents, files, audit.clone())
        .import(
            "https://drive.google.com/drive/folders/FFFFFolder01",
            ImportTarget::Section { section_id },
            ImportMode::FileOrFolder,
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.scanned, 0);
    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 0);
    assert!(report.trace.iter().any(|e| e.contains("scanned 0 items")));
    assert_eq!(audit.entries().len(), 1);
}

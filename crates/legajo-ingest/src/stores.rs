//! Metadata-store trait seams.
//!
//! The orchestrators depend on these traits rather than on the sqlx
//! repositories directly, so they can be exercised against in-memory fakes.
//! The delegating impls below wire them to the real repositories.

use async_trait::async_trait;
use legajo_core::models::{Document, FileRecord, FileVersion};
use legajo_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait FileStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create_file(
        &self,
        document_id: Uuid,
        display_name: String,
        storage_key: String,
        byte_size: i64,
        extension: String,
        mime_type: String,
        uploaded_by: Option<Uuid>,
    ) -> Result<FileRecord, AppError>;

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError>;

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64, AppError>;

    async fn update_blob_metadata(
        &self,
        id: Uuid,
        byte_size: i64,
        extension: String,
        mime_type: String,
    ) -> Result<FileRecord, AppError>;

    async fn delete_file(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait VersionStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn insert_snapshot(
        &self,
        file_id: Uuid,
        storage_key: String,
        byte_size: i64,
        extension: String,
        mime_type: String,
        reason: String,
        created_by: Option<Uuid>,
    ) -> Result<FileVersion, AppError>;

    async fn get_version(
        &self,
        file_id: Uuid,
        version_no: i32,
    ) -> Result<Option<FileVersion>, AppError>;

    async fn list_versions(&self, file_id: Uuid) -> Result<Vec<FileVersion>, AppError>;

    async fn delete_for_file(&self, file_id: Uuid) -> Result<u64, AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        section_id: Uuid,
        name: String,
        created_by: Option<Uuid>,
    ) -> Result<Document, AppError>;

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    async fn delete_document(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(
        &self,
        actor: Option<Uuid>,
        action: &str,
        detail: serde_json::Value,
    ) -> Result<(), AppError>;
}

#[async_trait]
impl FileStore for legajo_db::FileRepository {
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
        legajo_db::FileRepository::create_file(
            self,
            document_id,
            display_name,
            storage_key,
            byte_size,
            extension,
            mime_type,
            uploaded_by,
        )
        .await
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        legajo_db::FileRepository::get_file(self, id).await
    }

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64, AppError> {
        legajo_db::FileRepository::count_for_document(self, document_id).await
    }

    async fn update_blob_metadata(
        &self,
        id: Uuid,
        byte_size: i64,
        extension: String,
        mime_type: String,
    ) -> Result<FileRecord, AppError> {
        legajo_db::FileRepository::update_blob_metadata(self, id, byte_size, extension, mime_type)
            .await
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), AppError> {
        legajo_db::FileRepository::delete_file(self, id).await
    }
}

#[async_trait]
impl VersionStore for legajo_db::VersionRepository {
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
        legajo_db::VersionRepository::insert_snapshot(
            self, file_id, storage_key, byte_size, extension, mime_type, reason, created_by,
        )
        .await
    }

    async fn get_version(
        &self,
        file_id: Uuid,
        version_no: i32,
    ) -> Result<Option<FileVersion>, AppError> {
        legajo_db::VersionRepository::get_version(self, file_id, version_no).await
    }

    async fn list_versions(&self, file_id: Uuid) -> Result<Vec<FileVersion>, AppError> {
        legajo_db::VersionRepository::list_versions(self, file_id).await
    }

    async fn delete_for_file(&self, file_id: Uuid) -> Result<u64, AppError> {
        legajo_db::VersionRepository::delete_for_file(self, file_id).await
    }
}

#[async_trait]
impl DocumentStore for legajo_db::DocumentRepository {
    async fn create_document(
        &self,
        section_id: Uuid,
        name: String,
        created_by: Option<Uuid>,
    ) -> Result<Document, AppError> {
        legajo_db::DocumentRepository::create_document(self, section_id, name, created_by).await
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        legajo_db::DocumentRepository::get_document(self, id).await
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), AppError> {
        legajo_db::DocumentRepository::delete_document(self, id).await
    }
}

#[async_trait]
impl AuditSink for legajo_db::AuditLogRepository {
    async fn append(
        &self,
        actor: Option<Uuid>,
        action: &str,
        detail: serde_json::Value,
    ) -> Result<(), AppError> {
        legajo_db::AuditLogRepository::append(self, actor, action, detail).await
    }
}

use legajo_core::{models::FileRecord, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for File Records (one row per stored blob).
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_files", db.operation = "insert"))]
    #[allow(clippy::too_many_arguments)]
    pub async fn create_file(
        &self,
        document_id: Uuid,
        display_name: String,
        storage_key: String,
        byte_size: i64,
        extension: String,
        mime_type: String,
        uploaded_by: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            INSERT INTO document_files
                (document_id, display_name, storage_key, byte_size, extension, mime_type, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, document_id, display_name, storage_key, byte_size, extension,
                      mime_type, uploaded_by, created_at
            "#,
        )
        .bind(document_id)
        .bind(&display_name)
        .bind(&storage_key)
        .bind(byte_size)
        .bind(&extension)
        .bind(&mime_type)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_files", db.operation = "select", db.record_id = %id))]
    pub async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            SELECT id, document_id, display_name, storage_key, byte_size, extension,
                   mime_type, uploaded_by, created_at
            FROM document_files WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    /// Current file count for a document, checked against the per-document cap
    /// before a batch is accepted.
    #[tracing::instrument(skip(self), fields(db.table = "document_files", db.operation = "select"))]
    pub async fn count_for_document(&self, document_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM document_files WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Update the blob-derived metadata after an inline edit or rollback. The
    /// storage key never changes; only size/type fields follow the new blob.
    #[tracing::instrument(skip(self), fields(db.table = "document_files", db.operation = "update", db.record_id = %id))]
    pub async fn update_blob_metadata(
        &self,
        id: Uuid,
        byte_size: i64,
        extension: String,
        mime_type: String,
    ) -> Result<FileRecord, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            UPDATE document_files
            SET byte_size = $2, extension = $3, mime_type = $4
            WHERE id = $1
            RETURNING id, document_id, display_name, storage_key, byte_size, extension,
                      mime_type, uploaded_by, created_at
            "#,
        )
        .bind(id)
        .bind(byte_size)
        .bind(&extension)
        .bind(&mime_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_files", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_file(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM document_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

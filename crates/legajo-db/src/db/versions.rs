use legajo_core::{models::FileVersion, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for Version Records.
///
/// Version rows are immutable once written. Numbering is assigned inside the
/// INSERT as `max(version_no) + 1` for the file, so numbers are strictly
/// increasing and never reused, even after a rollback.
#[derive(Clone)]
pub struct VersionRepository {
    pool: PgPool,
}

impl VersionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_file_versions", db.operation = "insert"))]
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_snapshot(
        &self,
        file_id: Uuid,
        storage_key: String,
        byte_size: i64,
        extension: String,
        mime_type: String,
        reason: String,
        created_by: Option<Uuid>,
    ) -> Result<FileVersion, AppError> {
        let version = sqlx::query_as::<Postgres, FileVersion>(
            r#"
            INSERT INTO document_file_versions
                (file_id, version_no, storage_key, byte_size, extension, mime_type, reason, created_by)
            SELECT $1, COALESCE(MAX(version_no), 0) + 1, $2, $3, $4, $5, $6, $7
            FROM document_file_versions WHERE file_id = $1
            RETURNING id, file_id, version_no, storage_key, byte_size, extension,
                      mime_type, reason, created_by, created_at
            "#,
        )
        .bind(file_id)
        .bind(&storage_key)
        .bind(byte_size)
        .bind(&extension)
        .bind(&mime_type)
        .bind(&reason)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(version)
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_file_versions", db.operation = "select"))]
    pub async fn get_version(
        &self,
        file_id: Uuid,
        version_no: i32,
    ) -> Result<Option<FileVersion>, AppError> {
        let version = sqlx::query_as::<Postgres, FileVersion>(
            r#"
            SELECT id, file_id, version_no, storage_key, byte_size, extension,
                   mime_type, reason, created_by, created_at
            FROM document_file_versions WHERE file_id = $1 AND version_no = $2
            "#,
        )
        .bind(file_id)
        .bind(version_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }

    /// Version history for a file, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "document_file_versions", db.operation = "select"))]
    pub async fn list_versions(&self, file_id: Uuid) -> Result<Vec<FileVersion>, AppError> {
        let versions = sqlx::query_as::<Postgres, FileVersion>(
            r#"
            SELECT id, file_id, version_no, storage_key, byte_size, extension,
                   mime_type, reason, created_by, created_at
            FROM document_file_versions WHERE file_id = $1
            ORDER BY version_no DESC
            "#,
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(versions)
    }

    /// Remove every version row for a file. Only called when the parent File
    /// Record is deleted.
    #[tracing::instrument(skip(self), fields(db.table = "document_file_versions", db.operation = "delete"))]
    pub async fn delete_for_file(&self, file_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM document_file_versions WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

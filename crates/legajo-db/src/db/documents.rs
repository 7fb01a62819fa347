use legajo_core::{models::Document, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for catalog documents.
///
/// The catalog layer owns these rows; the ingestion core only creates them on
/// demand during import and deletes a fresh one when the item's file write
/// fails afterwards.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "insert"))]
    pub async fn create_document(
        &self,
        section_id: Uuid,
        name: String,
        created_by: Option<Uuid>,
    ) -> Result<Document, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(
            r#"
            INSERT INTO documents (section_id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, section_id, name, created_by, created_at
            "#,
        )
        .bind(section_id)
        .bind(&name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    pub async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(
            "SELECT id, section_id, name, created_by, created_at FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_document(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

use legajo_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Append-only audit log.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, detail), fields(db.table = "audit_log", db.operation = "insert"))]
    pub async fn append(
        &self,
        actor: Option<Uuid>,
        action: &str,
        detail: serde_json::Value,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO audit_log (actor, action, detail) VALUES ($1, $2, $3)")
            .bind(actor)
            .bind(action)
            .bind(detail)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

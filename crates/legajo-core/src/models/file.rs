use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored blob owned by exactly one Document.
///
/// `display_name` is the user-supplied filename, sanitized for display only.
/// `storage_key` is system-generated from a random identifier plus an
/// allow-listed extension and is never derived from the display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    pub document_id: Uuid,
    pub display_name: String,
    pub storage_key: String,
    pub byte_size: i64,
    pub extension: String,
    pub mime_type: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable snapshot of a File Record's blob and metadata at a point in
/// time. Version numbers are strictly increasing per file and never reused,
/// even after a rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileVersion {
    pub id: Uuid,
    pub file_id: Uuid,
    pub version_no: i32,
    pub storage_key: String,
    pub byte_size: i64,
    pub extension: String,
    pub mime_type: String,
    pub reason: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Why a snapshot was taken. Stored as the version row's reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotReason {
    Manual,
    BeforeDelete,
    BeforeInlineEdit,
    BeforeRollbackTo(i32),
}

impl SnapshotReason {
    pub fn code(&self) -> String {
        match self {
            SnapshotReason::Manual => "manual".to_string(),
            SnapshotReason::BeforeDelete => "before_delete".to_string(),
            SnapshotReason::BeforeInlineEdit => "before_inline_edit".to_string(),
            SnapshotReason::BeforeRollbackTo(n) => format!("before_rollback_to_v{}", n),
        }
    }
}

impl std::fmt::Display for SnapshotReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

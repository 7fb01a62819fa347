//! Shared storage-key layout.
//!
//! Current blobs live under `{document_id}/{safe_name}`; version snapshots
//! under `versions/{document_id}/{file_id}/{timestamp}-{safe_name}`. Deleting
//! a document's prefix is sufficient to reclaim all of its blobs.

use uuid::Uuid;

/// Storage key for a document's current blob.
pub fn file_key(document_id: Uuid, safe_name: &str) -> String {
    format!("{}/{}", document_id, safe_name)
}

/// Storage key for a version snapshot of a file.
pub fn version_key(document_id: Uuid, file_id: Uuid, timestamp: i64, safe_name: &str) -> String {
    format!(
        "versions/{}/{}/{}-{}",
        document_id, file_id, timestamp, safe_name
    )
}

/// Prefix covering every version snapshot of a file.
pub fn version_prefix(document_id: Uuid, file_id: Uuid) -> String {
    format!("versions/{}/{}/", document_id, file_id)
}

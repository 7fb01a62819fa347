//! Shared constants for the ingestion pipeline.

/// Document formats accepted for upload and import. Anything else is stored
/// under the generic fallback extension.
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "xls", "xlsx", "txt", "csv"];

/// Extension substituted when the original filename carries a disallowed or
/// missing suffix.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Content types accepted for local batch upload.
pub const ALLOWED_CONTENT_TYPES: [&str; 8] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
    "application/octet-stream",
];

/// Cap on stored files per catalog document.
pub const DEFAULT_MAX_FILES_PER_DOCUMENT: i64 = 100;

/// Per-file size ceiling for local batch upload.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Number of files uploaded concurrently within one batch window.
pub const DEFAULT_UPLOAD_WINDOW: usize = 3;

/// Upper bound on operational trace entries kept per import run.
pub const MAX_TRACE_ENTRIES: usize = 50;

/// Upper bound on skip-reason samples returned from an import run.
pub const MAX_SKIP_SAMPLES: usize = 10;

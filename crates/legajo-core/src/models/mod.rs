//! Domain models

pub mod batch;
pub mod document;
pub mod file;
pub mod import;
pub mod version;

pub use batch::{BatchOutcome, BatchResult, ItemFailure};
pub use document::Document;
pub use file::FileRecord;
pub use import::{ImportMode, ImportReport, ImportTarget};
pub use version::{FileVersion, SnapshotReason};

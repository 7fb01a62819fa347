//! Database repositories for the metadata store
//!
//! One repository per entity, each owning its own queries. A "table/column
//! not found" error from any of these is detected upstream via
//! `AppError::is_missing_schema` and flips the versioning engine into
//! degraded mode; every other database error is fatal to the operation that
//! triggered it.

pub mod audit;
pub mod documents;
pub mod files;
pub mod versions;

pub use audit::AuditLogRepository;
pub use documents::DocumentRepository;
pub use files::FileRepository;
pub use versions::VersionRepository;

//! Legajo DB Library
//!
//! sqlx/Postgres repositories for the catalog metadata the ingestion
//! pipeline records: documents, file records, version records, and the
//! append-only audit log.

pub mod db;

pub use db::{AuditLogRepository, DocumentRepository, FileRepository, VersionRepository};

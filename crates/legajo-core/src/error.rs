//! Error types module
//!
//! All errors in the pipeline are unified under the `AppError` enum, which can
//! represent database, storage, provider, and validation failures.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature so downstream crates that never touch the metadata store can build
//! without it.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Content provider error: {0}")]
    Provider(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Usage limit exceeded: {resource} usage {used}/{limit}")]
    UsageLimitExceeded {
        resource: String,
        used: i64,
        limit: i64,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Postgres error codes that mean the versioning schema is not provisioned.
/// 42P01 = undefined_table, 42703 = undefined_column.
#[cfg(feature = "sqlx")]
const MISSING_SCHEMA_CODES: [&str; 2] = ["42P01", "42703"];

impl AppError {
    /// Whether this error indicates an absent table or column rather than a
    /// runtime database failure. Used to flip optional subsystems (versioning)
    /// into degraded mode instead of failing the caller's operation.
    #[cfg(feature = "sqlx")]
    pub fn is_missing_schema(&self) -> bool {
        match self {
            AppError::Database(SqlxError::Database(db_err)) => db_err
                .code()
                .map(|code| MISSING_SCHEMA_CODES.contains(&code.as_ref()))
                .unwrap_or(false),
            _ => false,
        }
    }

    #[cfg(not(feature = "sqlx"))]
    pub fn is_missing_schema(&self) -> bool {
        false
    }

    /// Get the error type name for diagnostics
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::Provider(_) => "Provider",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::UsageLimitExceeded { .. } => "UsageLimitExceeded",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

//! Configuration module
//!
//! Configuration for the ingestion pipeline: metadata store, blob storage,
//! external content provider, and upload limits. Everything is read from the
//! environment (`.env` supported via dotenvy) with typed getters and a
//! `validate()` pass at startup.

use std::env;

use crate::constants::{
    DEFAULT_MAX_FILES_PER_DOCUMENT, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_UPLOAD_WINDOW,
};

/// Application configuration for the ingestion pipeline.
#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres connection string for the metadata store.
    pub database_url: String,

    // Blob storage configuration
    pub storage_bucket: String,
    pub storage_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, Supabase Storage,
    /// DigitalOcean Spaces, ...). Also the base for the raw REST write path.
    pub storage_endpoint: Option<String>,
    /// Elevated credential for the service-authority REST write path.
    pub storage_service_token: Option<String>,

    // External content provider configuration
    pub provider_api_base: String,
    pub provider_api_key: Option<String>,

    // Upload limits
    pub max_files_per_document: i64,
    pub max_file_size_bytes: usize,
    pub upload_window: usize,

    /// Versioning can be disabled outright; it also degrades at runtime when
    /// its schema is absent.
    pub versioning_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Load .env if present; ignore absence.
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let storage_bucket = env::var("STORAGE_BUCKET")
            .map_err(|_| anyhow::anyhow!("STORAGE_BUCKET environment variable is required"))?;

        let storage_region = env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let storage_endpoint = env::var("STORAGE_ENDPOINT").ok();
        let storage_service_token = env::var("STORAGE_SERVICE_TOKEN").ok();

        let provider_api_base = env::var("PROVIDER_API_BASE")
            .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".to_string());
        let provider_api_key = env::var("PROVIDER_API_KEY").ok();

        let max_files_per_document = parse_env("MAX_FILES_PER_DOCUMENT")?
            .unwrap_or(DEFAULT_MAX_FILES_PER_DOCUMENT);
        let max_file_size_bytes =
            parse_env("MAX_FILE_SIZE_BYTES")?.unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES);
        let upload_window = parse_env("UPLOAD_WINDOW")?.unwrap_or(DEFAULT_UPLOAD_WINDOW);

        let versioning_enabled = env::var("VERSIONING_ENABLED")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "off"))
            .unwrap_or(true);

        Ok(Config {
            database_url,
            storage_bucket,
            storage_region,
            storage_endpoint,
            storage_service_token,
            provider_api_base,
            provider_api_key,
            max_files_per_document,
            max_file_size_bytes,
            upload_window,
            versioning_enabled,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_files_per_document <= 0 {
            anyhow::bail!("MAX_FILES_PER_DOCUMENT must be positive");
        }
        if self.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_BYTES must be positive");
        }
        if self.upload_window == 0 {
            anyhow::bail!("UPLOAD_WINDOW must be at least 1");
        }
        if let Some(ref endpoint) = self.storage_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                anyhow::bail!("STORAGE_ENDPOINT must be an http(s) URL");
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(None),
    }
}

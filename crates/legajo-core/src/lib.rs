//! Legajo Core Library
//!
//! Shared foundation for the legajo document ingestion pipeline: domain
//! models, the unified error type, configuration, and the safe-naming layer
//! that derives storage object names.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;

pub use config::Config;
pub use error::AppError;

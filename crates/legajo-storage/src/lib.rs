//! Legajo Storage Library
//!
//! Blob persistence for the ingestion pipeline. Writes go through an ordered
//! chain of upload strategies (signed URL, SDK, raw REST; service then caller
//! authority) so that storage policy quirks on any single pathway do not fail
//! the operation. See the `strategy` module for the chain contract.
//!
//! # Storage key format
//!
//! - **Current blob**: `{document_id}/{safe_name}`
//! - **Version snapshot**: `versions/{document_id}/{file_id}/{ts}-{safe_name}`
//!
//! Key generation is centralized in the `keys` module; safe names come from
//! `legajo_core::naming` and are never derived from user filenames.

pub mod chained;
pub mod client;
pub mod factory;
pub mod keys;
pub mod rest;
pub mod sdk;
pub mod strategy;
pub mod traits;

pub use chained::ChainedStorage;
pub use client::ObjectClient;
pub use factory::create_storage;
pub use rest::RestObjectClient;
pub use sdk::SdkObjectClient;
pub use strategy::{RestPutStrategy, SdkPutStrategy, SignedUrlStrategy, UploadChain, UploadStrategy};
pub use traits::{
    format_trace, Authority, Storage, StorageError, StorageResult, StrategyFailure, UploadReceipt,
};

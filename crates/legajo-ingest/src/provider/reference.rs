//! Source-reference classification.
//!
//! Whether a reference points at a file or a folder is decided purely from
//! the reference's shape, so a disallowed folder import can be rejected
//! before any network call.

use std::sync::OnceLock;

use legajo_core::AppError;
use regex::Regex;

/// A classified reference into the external content provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    File(String),
    Folder(String),
}

impl SourceRef {
    pub fn id(&self) -> &str {
        match self {
            SourceRef::File(id) => id,
            SourceRef::Folder(id) => id,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, SourceRef::Folder(_))
    }
}

fn file_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").unwrap())
}

fn folder_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/folders/([A-Za-z0-9_-]+)").unwrap())
}

fn open_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap())
}

fn bare_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").unwrap())
}

/// Classify a user-supplied reference as a file or folder reference.
///
/// Accepted shapes: share URLs (`.../file/d/{id}/...`, `.../folders/{id}`),
/// `open?id={id}` links, and bare item identifiers (classified as files; a
/// bare folder id is only discovered at metadata time).
pub fn classify(reference: &str) -> Result<SourceRef, AppError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "empty source reference".to_string(),
        ));
    }

    if let Some(captures) = folder_url_re().captures(trimmed) {
        return Ok(SourceRef::Folder(captures[1].to_string()));
    }
    if let Some(captures) = file_url_re().captures(trimmed) {
        return Ok(SourceRef::File(captures[1].to_string()));
    }
    if let Some(captures) = open_id_re().captures(trimmed) {
        return Ok(SourceRef::File(captures[1].to_string()));
    }
    if bare_id_re().is_match(trimmed) {
        return Ok(SourceRef::File(trimmed.to_string()));
    }

    Err(AppError::InvalidInput(format!(
        "unrecognized source reference shape: {}",
        trimmed
    )))
}

//! Safe naming for stored blobs.
//!
//! Storage object names are never derived from user-supplied filenames: the
//! persisted name is always `{uuid}.{extension}`, where the extension is kept
//! only if it appears in the document allow-list. Display names go through a
//! separate normalizer that keeps them readable for diagnostics but is never
//! used for a storage key.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::constants::{ALLOWED_EXTENSIONS, FALLBACK_EXTENSION};

/// Extract the lower-cased, alphanumeric-only extension of a filename if it is
/// allow-listed; otherwise return the generic fallback extension.
pub fn safe_extension(original_filename: &str) -> &'static str {
    let candidate: String = original_filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect();

    // No '.' at all means rsplit returns the whole name; reject it the same
    // way as an unknown suffix.
    if !original_filename.contains('.') {
        return FALLBACK_EXTENSION;
    }

    ALLOWED_EXTENSIONS
        .iter()
        .find(|ext| **ext == candidate)
        .copied()
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Produce a collision-free object name for a blob: `{uuid}.{ext}`.
pub fn safe_object_name(original_filename: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), safe_extension(original_filename))
}

/// Normalize a filename for display and diagnostics: diacritics stripped,
/// non-word characters collapsed to `_`. Readable, but not collision-free;
/// never use this for a persisted storage key.
pub fn display_slug(original_filename: &str) -> String {
    let folded: String = original_filename
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut slug = String::with_capacity(folded.len());
    let mut last_was_sep = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            slug.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }

    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

//! Cache Key Derivation
//!
//! Maps list options to a fixed-length key. The options are first rendered as
//! canonical JSON (object keys sorted, empty filter omitted, strings escaped),
//! then digested with SHA-256.

use sha2::{Digest, Sha256};

use crate::models::ListOptions;

/// Derives the cache key for `options`.
///
/// `None` maps to the empty string, a key shared by every option-less request.
pub fn derive_key(options: Option<&ListOptions>) -> String {
    match options {
        Some(options) => digest(&canonical_form(options)),
        None => String::new(),
    }
}

/// Renders `options` in a form that depends only on their values.
///
/// `serde_json::Map` keeps keys sorted, and `FilterSpec` is itself ordered, so
/// two equal option sets always produce the same bytes.
pub fn canonical_form(options: &ListOptions) -> String {
    serde_json::to_value(options)
        .map(|value| value.to_string())
        .unwrap_or_default()
}

fn digest(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

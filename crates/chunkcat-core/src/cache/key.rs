//! Cache key derivation: the last path segment of the chunk URL.

use sha2::{Digest, Sha256};

use crate::storage::TEMP_SUFFIX;

const NAME_MAX: usize = 255;

/// Longest key whose `.part` sibling still fits in one file name.
const MAX_KEY_LEN: usize = NAME_MAX - TEMP_SUFFIX.len();

/// Extracts the last non-empty path segment of a URL (query and fragment ignored).
fn last_path_segment(locator: &str) -> Option<String> {
    let parsed = url::Url::parse(locator).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

/// Makes a path segment safe to use as a single file name.
///
/// Separators, NUL and control characters become `_`, runs of `_` collapse,
/// leading and trailing dots/spaces/underscores are trimmed, and the result is
/// capped at [`MAX_KEY_LEN`] bytes on a char boundary.
fn sanitize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut prev_underscore = false;
    for c in segment.chars() {
        let c = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        out.push(c);
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '_' || c == ' ');
    let mut take = trimmed.len().min(MAX_KEY_LEN);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

/// Derive the cache slot name for a chunk locator.
///
/// Deterministic: the same locator always maps to the same key. Locators
/// without a usable final segment fall back to the SHA-256 hex of the locator.
pub fn cache_key(locator: &str) -> String {
    last_path_segment(locator)
        .map(|s| sanitize(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| hex::encode(Sha256::digest(locator.as_bytes())))
}

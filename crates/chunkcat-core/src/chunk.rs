//! Chunk identity, advertised metadata and retrieved payloads.

use crate::integrity::IntegrityOutcome;

/// Request-time identity of one chunk. `index` defines the final byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub locator: String,
    pub expected_digest: Option<String>,
}

impl ChunkDescriptor {
    pub fn new(index: usize, locator: impl Into<String>) -> Self {
        Self {
            index,
            locator: locator.into(),
            expected_digest: None,
        }
    }

    /// Returns a copy carrying the digest advertised by the source. Empty digests are dropped.
    pub fn with_expected_digest(&self, digest: Option<&str>) -> Self {
        Self {
            index: self.index,
            locator: self.locator.clone(),
            expected_digest: digest.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }
}

/// What a source advertises about a chunk before it is retrieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Byte length from `Content-Length`, if sent.
    pub size: Option<u64>,
    /// Content hash from `ETag`, if sent. Never an empty string.
    pub digest: Option<String>,
}

/// Where a payload's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    CacheHit,
    Network,
}

/// Bytes of one chunk plus provenance. Produced once per descriptor.
#[derive(Debug, Clone)]
pub struct ChunkPayload {
    pub index: usize,
    pub bytes: Vec<u8>,
    pub origin: PayloadOrigin,
    pub integrity: IntegrityOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_starts_without_digest() {
        let d = ChunkDescriptor::new(3, "https://example.com/part_ad");
        assert_eq!(d.index, 3);
        assert_eq!(d.locator, "https://example.com/part_ad");
        assert!(d.expected_digest.is_none());
    }

    #[test]
    fn with_expected_digest_keeps_identity() {
        let d = ChunkDescriptor::new(1, "https://example.com/a");
        let resolved = d.with_expected_digest(Some("abc"));
        assert_eq!(resolved.index, 1);
        assert_eq!(resolved.locator, d.locator);
        assert_eq!(resolved.expected_digest.as_deref(), Some("abc"));
        assert!(d.expected_digest.is_none());
    }

    #[test]
    fn empty_digest_is_treated_as_absent() {
        let d = ChunkDescriptor::new(0, "https://example.com/a");
        assert!(d.with_expected_digest(Some("")).expected_digest.is_none());
        assert!(d.with_expected_digest(None).expected_digest.is_none());
    }
}

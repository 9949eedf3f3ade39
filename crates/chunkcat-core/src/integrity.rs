//! Chunk integrity verification.
//!
//! The algorithm is picked purely from the length of the expected hex digest:
//! 32 characters is MD5, 40 is SHA-1, 64 is SHA-256. Anything else is logged
//! and skipped. A mismatch is reported, never fatal.

use anyhow::{Context, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Select an algorithm from the character length of a hex digest.
    pub fn from_digest_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(DigestAlgorithm::Md5),
            40 => Some(DigestAlgorithm::Sha1),
            64 => Some(DigestAlgorithm::Sha256),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(DigestAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            other => anyhow::bail!("unsupported digest algorithm: {}", other),
        }
    }
}

/// Incremental hasher over the three supported algorithms.
enum Hasher {
    Md5(md5::Context),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            DigestAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(data),
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
        }
    }

    fn finish_hex(self) -> String {
        match self {
            Hasher::Md5(ctx) => format!("{:x}", ctx.compute()),
            Hasher::Sha1(h) => hex::encode(h.finalize()),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

/// Digest of `data` under `algorithm`, as lowercase hex.
pub fn calculate_digest(algorithm: DigestAlgorithm, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finish_hex()
}

/// Digest of a file, read in chunks to keep memory use bounded.
pub fn digest_path(algorithm: DigestAlgorithm, path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Hasher::new(algorithm);
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish_hex())
}

/// Result of checking one chunk against its advertised digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityOutcome {
    /// No digest was advertised for the chunk.
    NotChecked,
    Matched(DigestAlgorithm),
    Mismatch {
        algorithm: DigestAlgorithm,
        expected: String,
        actual: String,
    },
    /// Digest length does not map to a known algorithm; verification skipped.
    UnknownAlgorithm { len: usize },
}

/// Verify `data` against `expected` and log the observation. Never fails the chunk.
pub fn verify_chunk(data: &[u8], expected: &str, chunk: usize) -> IntegrityOutcome {
    let algorithm = match DigestAlgorithm::from_digest_len(expected.len()) {
        Some(a) => a,
        None => {
            tracing::warn!(chunk, hash = expected, "unknown hash length, skipping verification");
            return IntegrityOutcome::UnknownAlgorithm {
                len: expected.len(),
            };
        }
    };

    let actual = calculate_digest(algorithm, data);
    if actual != expected {
        tracing::warn!(chunk, %algorithm, expected, actual = %actual, "hash mismatch");
        return IntegrityOutcome::Mismatch {
            algorithm,
            expected: expected.to_string(),
            actual,
        };
    }

    tracing::info!(chunk, %algorithm, "hash matched");
    IntegrityOutcome::Matched(algorithm)
}

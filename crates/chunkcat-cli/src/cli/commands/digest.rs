//! Digest command: hash a local file, e.g. to compare with a chunk's ETag.

use anyhow::Result;
use chunkcat_core::integrity::{self, DigestAlgorithm};
use std::path::Path;

pub fn run_digest(path: &Path, algorithm: &str) -> Result<()> {
    let algorithm: DigestAlgorithm = algorithm.parse()?;
    let digest = integrity::digest_path(algorithm, path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}

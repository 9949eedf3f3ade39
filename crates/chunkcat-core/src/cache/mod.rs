//! Local chunk cache: one file per chunk, named by the locator's last path segment.
//!
//! Calls are blocking; the fetcher runs them on the blocking pool.

mod key;

pub use key::cache_key;

use std::fs;
use std::io;
use std::path::PathBuf;

/// Directory-backed store of chunk bytes.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Cached bytes for `key`, or `None` if the slot is empty or unreadable.
    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "cache read failed");
                }
                None
            }
        }
    }

    /// Store `data` under `key`. Written to a `.part` sibling and renamed, so a
    /// crash never leaves a truncated entry that a later run would trust.
    pub fn write(&self, key: &str, data: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let final_path = self.path_for(key);
        let temp_path = crate::storage::temp_path(&final_path);
        if let Err(e) = fs::write(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &final_path)
    }
}

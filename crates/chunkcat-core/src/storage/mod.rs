//! Output file lifecycle.
//!
//! Assembled bytes go to `<output>.part`; only a complete, synced file is
//! renamed onto the output path. A sink dropped before `finalize` removes its
//! temp file, so failed jobs never leave partial output behind.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

async fn open_truncate(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await
}

/// Sequential writer for the assembled output. Owned by one task at a time.
#[derive(Debug)]
pub struct OutputSink {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
    bytes_written: u64,
    finalized: bool,
}

impl OutputSink {
    /// Create (or truncate) the temp file for `final_path`. If a parent
    /// directory is missing, the tree is created and the open retried once.
    pub async fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = match open_truncate(&temp_path).await {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let parent = temp_path.parent().filter(|p| !p.as_os_str().is_empty());
                if let Some(parent) = parent {
                    tracing::debug!(dir = %parent.display(), "creating output directory");
                    tokio::fs::create_dir_all(parent).await?;
                }
                open_truncate(&temp_path).await?
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
            bytes_written: 0,
            finalized: false,
        })
    }

    pub async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data).await?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and rename onto the final path. Returns total bytes written.
    pub async fn finalize(mut self) -> io::Result<u64> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        tokio::fs::rename(&self.temp_path, &self.final_path).await?;
        self.finalized = true;
        Ok(self.bytes_written)
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        if !self.finalized {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.temp_path.display(),
                        error = %e,
                        "failed to remove partial output"
                    );
                }
            }
        }
    }
}

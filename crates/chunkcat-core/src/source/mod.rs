//! Network collaborators: metadata probe and full-chunk retrieval.
//!
//! The pipeline only depends on the `ChunkSource` trait; `CurlSource` is the
//! libcurl-backed implementation used by the CLI.

mod http;
mod parse;

pub use self::http::{CurlSource, TransferOptions};

use crate::chunk::ChunkMetadata;
use crate::control::CancelSignal;
use crate::error::SourceError;

/// Blocking access to chunk sources. Calls run on tokio's blocking pool, one
/// per chunk, and should give up promptly once `cancel` is set.
pub trait ChunkSource: Send + Sync + 'static {
    /// Metadata-only exchange (HEAD): advertised size and digest.
    fn resolve(&self, locator: &str, cancel: &CancelSignal) -> Result<ChunkMetadata, SourceError>;

    /// Retrieve the whole chunk.
    fn retrieve(&self, locator: &str, cancel: &CancelSignal) -> Result<Vec<u8>, SourceError>;
}

pub mod config;
pub mod logging;

pub mod cache;
pub mod chunk;
pub mod control;
pub mod error;
pub mod fetcher;
pub mod integrity;
pub mod job;
pub mod metadata;
pub mod orchestrator;
pub mod source;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use crate::cache::CacheStore;
pub use crate::error::{JobError, SourceError};
pub use crate::job::{DownloadJob, DownloadReport, JobState};
pub use crate::orchestrator::Orchestrator;
pub use crate::source::{ChunkSource, CurlSource, TransferOptions};

//! Error taxonomy for collaborator calls and for the pipeline as a whole.
//!
//! Cache write failures and integrity mismatches are not errors: they are
//! logged where they happen and the pipeline carries on.

use std::path::PathBuf;

use crate::job::JobState;

/// Failure of a single network collaborator call (metadata probe or chunk GET).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// Request never produced a usable response (DNS, connect, reset, bad URL, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// `Content-Length` was present but not a non-negative integer.
    #[error("malformed Content-Length: {0:?}")]
    MalformedSize(String),
    /// The shared cancellation signal stopped the call.
    #[error("cancelled")]
    Cancelled,
}

impl SourceError {
    pub fn is_status(&self) -> bool {
        matches!(self, SourceError::Status(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}

/// Fatal failure of a download job. Surfaced verbatim to the caller.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("no chunk locators given")]
    NoChunks,
    #[error("failed to get metadata of chunk {index} ({locator}): {source}")]
    Metadata {
        index: usize,
        locator: String,
        source: SourceError,
    },
    #[error("failed to download chunk {index} ({locator}): {source}")]
    Fetch {
        index: usize,
        locator: String,
        source: SourceError,
    },
    #[error("failed to create output {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write output {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A worker went away without reporting (panicked or was dropped).
    #[error("{phase:?}: {message}")]
    Task { phase: JobState, message: String },
}

impl JobError {
    /// State the job was in when this error moved it to `Failed`.
    pub fn phase(&self) -> JobState {
        match self {
            JobError::NoChunks | JobError::Metadata { .. } => JobState::ResolvingMetadata,
            JobError::Fetch { .. } | JobError::CreateOutput { .. } => JobState::FetchingChunks,
            JobError::WriteOutput { .. } => JobState::Assembling,
            JobError::Task { phase, .. } => *phase,
        }
    }
}

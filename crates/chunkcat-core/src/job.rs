//! Download job: the ordered chunk list, persistence flag and output target,
//! plus the lifecycle states the orchestrator moves it through.

use std::path::{Path, PathBuf};

use crate::chunk::ChunkDescriptor;
use crate::error::JobError;

/// Lifecycle of a job. `Failed` is absorbing and reachable from the first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    ResolvingMetadata,
    FetchingChunks,
    Assembling,
    Done,
    Failed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::ResolvingMetadata => "resolving-metadata",
            JobState::FetchingChunks => "fetching-chunks",
            JobState::Assembling => "assembling",
            JobState::Done => "done",
            JobState::Failed => "failed",
        }
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::ResolvingMetadata, JobState::FetchingChunks)
                | (JobState::FetchingChunks, JobState::Assembling)
                | (JobState::Assembling, JobState::Done)
                | (JobState::ResolvingMetadata, JobState::Failed)
                | (JobState::FetchingChunks, JobState::Failed)
                | (JobState::Assembling, JobState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

/// One run of the pipeline.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    chunks: Vec<ChunkDescriptor>,
    persist_chunks: bool,
    output: PathBuf,
}

impl DownloadJob {
    /// Build a job from chunk locators in output order.
    pub fn new<I, S>(
        locators: I,
        persist_chunks: bool,
        output: impl Into<PathBuf>,
    ) -> Result<Self, JobError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks: Vec<ChunkDescriptor> = locators
            .into_iter()
            .enumerate()
            .map(|(index, locator)| ChunkDescriptor::new(index, locator))
            .collect();
        if chunks.is_empty() {
            return Err(JobError::NoChunks);
        }
        Ok(Self {
            chunks,
            persist_chunks,
            output: output.into(),
        })
    }

    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    pub fn persist_chunks(&self) -> bool {
        self.persist_chunks
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub output: PathBuf,
    pub bytes_written: u64,
    pub chunks: usize,
    pub from_cache: usize,
    /// Chunks whose advertised digest matched.
    pub verified: usize,
    pub mismatched: usize,
    /// Chunks with no digest or a digest of unknown length.
    pub unverified: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use JobState::*;
        assert!(ResolvingMetadata.can_advance_to(FetchingChunks));
        assert!(FetchingChunks.can_advance_to(Assembling));
        assert!(Assembling.can_advance_to(Done));
        for s in [ResolvingMetadata, FetchingChunks, Assembling] {
            assert!(s.can_advance_to(Failed), "{} -> failed", s.as_str());
        }
    }

    #[test]
    fn illegal_transitions() {
        use JobState::*;
        assert!(!ResolvingMetadata.can_advance_to(Assembling));
        assert!(!FetchingChunks.can_advance_to(Done));
        assert!(!Done.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(ResolvingMetadata));
        assert!(Done.is_terminal() && Failed.is_terminal());
        assert!(!Assembling.is_terminal());
    }

    #[test]
    fn job_indexes_chunks_in_request_order() {
        let job = DownloadJob::new(
            ["https://h/a", "https://h/b", "https://h/c"],
            true,
            "out.bin",
        )
        .unwrap();
        let idx: Vec<usize> = job.chunks().iter().map(|c| c.index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
        assert_eq!(job.chunks()[1].locator, "https://h/b");
        assert!(job.persist_chunks());
        assert_eq!(job.output(), Path::new("out.bin"));
    }

    #[test]
    fn empty_job_rejected() {
        let err = DownloadJob::new(Vec::<String>::new(), false, "out").unwrap_err();
        assert!(matches!(err, JobError::NoChunks));
    }
}

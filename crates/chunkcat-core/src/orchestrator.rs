//! Drives a job through its phases: metadata, fetch, ordered assembly.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::chunk::{ChunkDescriptor, ChunkPayload, PayloadOrigin};
use crate::error::JobError;
use crate::fetcher::ChunkFetcher;
use crate::integrity::IntegrityOutcome;
use crate::job::{DownloadJob, DownloadReport, JobState};
use crate::metadata::MetadataResolver;
use crate::source::ChunkSource;
use crate::storage::OutputSink;

/// Current phase of one run. Transitions are logged.
struct StateTracker {
    state: JobState,
}

impl StateTracker {
    fn new() -> Self {
        tracing::debug!(state = JobState::ResolvingMetadata.as_str(), "job started");
        Self {
            state: JobState::ResolvingMetadata,
        }
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state.as_str(),
            next.as_str()
        );
        tracing::debug!(from = self.state.as_str(), to = next.as_str(), "job state");
        self.state = next;
    }
}

pub struct Orchestrator<S> {
    source: Arc<S>,
    cache: CacheStore,
}

impl<S: ChunkSource> Orchestrator<S> {
    pub fn new(source: Arc<S>, cache: CacheStore) -> Self {
        Self { source, cache }
    }

    /// Run `job` to completion. On success the output holds every chunk's
    /// bytes in index order; on failure no output file is left behind.
    pub async fn run(&self, job: &DownloadJob) -> Result<DownloadReport, JobError> {
        let mut tracker = StateTracker::new();
        match self.run_phases(job, &mut tracker).await {
            Ok(report) => {
                tracker.advance(JobState::Done);
                tracing::info!(
                    output = %report.output.display(),
                    bytes = report.bytes_written,
                    chunks = report.chunks,
                    from_cache = report.from_cache,
                    "download complete"
                );
                Ok(report)
            }
            Err(e) => {
                tracker.advance(JobState::Failed);
                tracing::error!(phase = e.phase().as_str(), error = %e, "download failed");
                Err(e)
            }
        }
    }

    async fn run_phases(
        &self,
        job: &DownloadJob,
        tracker: &mut StateTracker,
    ) -> Result<DownloadReport, JobError> {
        let chunks = job.chunks();
        tracing::info!(chunks = chunks.len(), "resolving chunk metadata");
        let metadata = MetadataResolver::new(Arc::clone(&self.source))
            .resolve(chunks)
            .await?;

        let resolved: Vec<ChunkDescriptor> = chunks
            .iter()
            .zip(&metadata)
            .map(|(chunk, meta)| chunk.with_expected_digest(meta.digest.as_deref()))
            .collect();
        let total: Option<u64> = metadata.iter().map(|m| m.size).sum();
        match total {
            Some(total) => tracing::info!(bytes = total, "all chunk metadata resolved"),
            None => tracing::info!("all chunk metadata resolved (size unknown)"),
        }

        tracker.advance(JobState::FetchingChunks);
        let output = job.output();
        let mut sink = OutputSink::create(output)
            .await
            .map_err(|source| JobError::CreateOutput {
                path: output.to_path_buf(),
                source,
            })?;

        let fetcher = ChunkFetcher::new(
            Arc::clone(&self.source),
            self.cache.clone(),
            job.persist_chunks(),
        );
        let payloads = fetcher.fetch_all(&resolved).await?;

        tracker.advance(JobState::Assembling);
        let mut report = DownloadReport {
            output: output.to_path_buf(),
            bytes_written: 0,
            chunks: payloads.len(),
            from_cache: 0,
            verified: 0,
            mismatched: 0,
            unverified: 0,
        };
        let write_err = |source| JobError::WriteOutput {
            path: output.to_path_buf(),
            source,
        };
        for payload in assembly_order(payloads) {
            tally(&mut report, &payload);
            if payload.bytes.is_empty() {
                tracing::debug!(chunk = payload.index, "empty chunk, nothing to write");
                continue;
            }
            sink.write(&payload.bytes).await.map_err(write_err)?;
        }
        report.bytes_written = sink.finalize().await.map_err(write_err)?;
        Ok(report)
    }
}

/// Payloads sorted by chunk index, independent of completion order.
fn assembly_order(mut payloads: Vec<ChunkPayload>) -> Vec<ChunkPayload> {
    payloads.sort_by_key(|p| p.index);
    payloads
}

fn tally(report: &mut DownloadReport, payload: &ChunkPayload) {
    if payload.origin == PayloadOrigin::CacheHit {
        report.from_cache += 1;
    }
    match payload.integrity {
        IntegrityOutcome::Matched(_) => report.verified += 1,
        IntegrityOutcome::Mismatch { .. } => report.mismatched += 1,
        IntegrityOutcome::NotChecked | IntegrityOutcome::UnknownAlgorithm { .. } => {
            report.unverified += 1
        }
    }
}

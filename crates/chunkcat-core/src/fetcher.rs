//! Phase 2: obtain every chunk's bytes, from the cache or the network,
//! concurrently and fail-fast. Verification happens here, per chunk.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::{cache_key, CacheStore};
use crate::chunk::{ChunkDescriptor, ChunkPayload, PayloadOrigin};
use crate::control::CancelSignal;
use crate::error::{JobError, SourceError};
use crate::integrity::{verify_chunk, IntegrityOutcome};
use crate::job::JobState;
use crate::source::ChunkSource;

pub struct ChunkFetcher<S> {
    source: Arc<S>,
    cache: CacheStore,
    persist: bool,
}

impl<S> Clone for ChunkFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cache: self.cache.clone(),
            persist: self.persist,
        }
    }
}

impl<S: ChunkSource> ChunkFetcher<S> {
    /// With `persist` off the cache is neither read nor written.
    pub fn new(source: Arc<S>, cache: CacheStore, persist: bool) -> Self {
        Self {
            source,
            cache,
            persist,
        }
    }

    /// Bytes for one chunk. Blocking; run on the blocking pool.
    pub fn fetch_one(
        &self,
        chunk: &ChunkDescriptor,
        cancel: &CancelSignal,
    ) -> Result<ChunkPayload, SourceError> {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }

        let key = self.persist.then(|| cache_key(&chunk.locator));
        if let Some(key) = &key {
            if let Some(bytes) = self.cache.read(key) {
                tracing::debug!(chunk = chunk.index, key = %key, "chunk found in cache");
                return Ok(self.payload(chunk, bytes, PayloadOrigin::CacheHit));
            }
        }

        tracing::debug!(chunk = chunk.index, url = %chunk.locator, "downloading chunk");
        let bytes = self.source.retrieve(&chunk.locator, cancel)?;
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }

        if let Some(key) = &key {
            if let Err(e) = self.cache.write(key, &bytes) {
                tracing::warn!(
                    chunk = chunk.index,
                    path = %self.cache.path_for(key).display(),
                    error = %e,
                    "error saving chunk file"
                );
            }
        }

        Ok(self.payload(chunk, bytes, PayloadOrigin::Network))
    }

    fn payload(
        &self,
        chunk: &ChunkDescriptor,
        bytes: Vec<u8>,
        origin: PayloadOrigin,
    ) -> ChunkPayload {
        let integrity = match chunk.expected_digest.as_deref() {
            Some(expected) => verify_chunk(&bytes, expected, chunk.index),
            None => IntegrityOutcome::NotChecked,
        };
        ChunkPayload {
            index: chunk.index,
            bytes,
            origin,
            integrity,
        }
    }

    /// Payloads for all chunks, in `chunks` order.
    ///
    /// Same shape as metadata resolution: one blocking task per chunk, results
    /// re-sequenced by position, first failure cancels the rest.
    pub async fn fetch_all(
        &self,
        chunks: &[ChunkDescriptor],
    ) -> Result<Vec<ChunkPayload>, JobError> {
        let cancel = CancelSignal::new();
        let (tx, mut rx) =
            mpsc::channel::<(usize, Result<ChunkPayload, SourceError>)>(chunks.len().max(1));

        for (pos, chunk) in chunks.iter().enumerate() {
            let fetcher = self.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();
            let chunk = chunk.clone();
            tokio::task::spawn_blocking(move || {
                let res = fetcher.fetch_one(&chunk, &cancel);
                let _ = tx.blocking_send((pos, res));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<ChunkPayload>> = vec![None; chunks.len()];
        while let Some((pos, res)) = rx.recv().await {
            match res {
                Ok(payload) => slots[pos] = Some(payload),
                Err(source) => {
                    cancel.cancel();
                    let chunk = &chunks[pos];
                    tracing::error!(
                        chunk = chunk.index,
                        url = %chunk.locator,
                        error = %source,
                        "failed to download chunk"
                    );
                    return Err(JobError::Fetch {
                        index: chunk.index,
                        locator: chunk.locator.clone(),
                        source,
                    });
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(pos, slot)| {
                slot.ok_or_else(|| JobError::Task {
                    phase: JobState::FetchingChunks,
                    message: format!(
                        "fetch task for chunk {} exited without a result",
                        chunks[pos].index
                    ),
                })
            })
            .collect()
    }
}

//! Phase 1: resolve size and digest of every chunk concurrently, fail-fast.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::chunk::{ChunkDescriptor, ChunkMetadata};
use crate::control::CancelSignal;
use crate::error::{JobError, SourceError};
use crate::job::JobState;
use crate::source::ChunkSource;

pub struct MetadataResolver<S> {
    source: Arc<S>,
}

impl<S: ChunkSource> MetadataResolver<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Metadata for each chunk, in `chunks` order.
    ///
    /// One blocking task per chunk. Results come back over a channel tagged
    /// with their position and are re-sequenced. The first failure cancels the
    /// remaining probes and is returned; results already received are dropped.
    pub async fn resolve(
        &self,
        chunks: &[ChunkDescriptor],
    ) -> Result<Vec<ChunkMetadata>, JobError> {
        let cancel = CancelSignal::new();
        let (tx, mut rx) =
            mpsc::channel::<(usize, Result<ChunkMetadata, SourceError>)>(chunks.len().max(1));

        for (pos, chunk) in chunks.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let tx = tx.clone();
            let cancel = cancel.clone();
            let locator = chunk.locator.clone();
            tokio::task::spawn_blocking(move || {
                let res = if cancel.is_cancelled() {
                    Err(SourceError::Cancelled)
                } else {
                    source.resolve(&locator, &cancel)
                };
                let _ = tx.blocking_send((pos, res));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<ChunkMetadata>> = vec![None; chunks.len()];
        while let Some((pos, res)) = rx.recv().await {
            match res {
                Ok(meta) => slots[pos] = Some(meta),
                Err(source) => {
                    cancel.cancel();
                    let chunk = &chunks[pos];
                    tracing::error!(
                        chunk = chunk.index,
                        error = %source,
                        "failed to get metadata of chunk"
                    );
                    return Err(JobError::Metadata {
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
                    phase: JobState::ResolvingMetadata,
                    message: format!(
                        "metadata task for chunk {} exited without a result",
                        chunks[pos].index
                    ),
                })
            })
            .collect()
    }
}

//! In-memory `ChunkSource` for unit tests: per-locator bodies, digests,
//! delays and failures, with call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::chunk::ChunkMetadata;
use crate::control::CancelSignal;
use crate::error::SourceError;
use crate::source::ChunkSource;

#[derive(Debug, Clone, Default)]
struct MockChunk {
    body: Vec<u8>,
    digest: Option<String>,
    delay: Duration,
    resolve_status: Option<u32>,
    retrieve_status: Option<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct MockSource {
    chunks: HashMap<String, MockChunk>,
    resolve_calls: AtomicUsize,
    retrieves: Mutex<Vec<String>>,
    cancelled: AtomicUsize,
}

impl MockSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn chunk(mut self, locator: &str, body: &[u8], digest: Option<&str>) -> Self {
        let entry = self.chunks.entry(locator.to_string()).or_default();
        entry.body = body.to_vec();
        entry.digest = digest.map(str::to_string);
        self
    }

    pub(crate) fn delay(mut self, locator: &str, delay: Duration) -> Self {
        self.chunks.entry(locator.to_string()).or_default().delay = delay;
        self
    }

    /// Both metadata and retrieval answer with `status`.
    pub(crate) fn failing(mut self, locator: &str, status: u32) -> Self {
        let entry = self.chunks.entry(locator.to_string()).or_default();
        entry.resolve_status = Some(status);
        entry.retrieve_status = Some(status);
        self
    }

    /// Metadata succeeds, retrieval answers with `status`.
    pub(crate) fn failing_retrieve(mut self, locator: &str, status: u32) -> Self {
        self.chunks.entry(locator.to_string()).or_default().retrieve_status = Some(status);
        self
    }

    pub(crate) fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn retrieve_calls(&self) -> usize {
        self.retrieves.lock().unwrap().len()
    }

    pub(crate) fn retrieves_of(&self, locator: &str) -> usize {
        self.retrieves
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.as_str() == locator)
            .count()
    }

    pub(crate) fn cancelled_calls(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn lookup(&self, locator: &str) -> Result<&MockChunk, SourceError> {
        self.chunks.get(locator).ok_or(SourceError::Status(404))
    }

    /// Sleeps in small steps so a cancelled sibling gives up promptly.
    fn wait(&self, delay: Duration, cancel: &CancelSignal) -> Result<(), SourceError> {
        let deadline = Instant::now() + delay;
        while Instant::now() < deadline {
            if cancel.is_cancelled() {
                self.cancelled.fetch_add(1, Ordering::SeqCst);
                return Err(SourceError::Cancelled);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        Ok(())
    }
}

impl ChunkSource for MockSource {
    fn resolve(&self, locator: &str, cancel: &CancelSignal) -> Result<ChunkMetadata, SourceError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let chunk = self.lookup(locator)?;
        self.wait(chunk.delay, cancel)?;
        if let Some(code) = chunk.resolve_status {
            return Err(SourceError::Status(code));
        }
        Ok(ChunkMetadata {
            size: Some(chunk.body.len() as u64),
            digest: chunk.digest.clone(),
        })
    }

    fn retrieve(&self, locator: &str, cancel: &CancelSignal) -> Result<Vec<u8>, SourceError> {
        self.retrieves.lock().unwrap().push(locator.to_string());
        let chunk = self.lookup(locator)?;
        self.wait(chunk.delay, cancel)?;
        if let Some(code) = chunk.retrieve_status {
            return Err(SourceError::Status(code));
        }
        Ok(chunk.body.clone())
    }
}

//! Fetch command: resolve, download and concatenate the given chunks.

use anyhow::Result;
use chunkcat_core::config;
use chunkcat_core::{CacheStore, CurlSource, DownloadJob, Orchestrator, TransferOptions};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub struct FetchArgs {
    pub urls: Vec<String>,
    pub keep_chunks: bool,
    pub output: PathBuf,
    pub cache_dir: Option<PathBuf>,
}

pub async fn run_fetch(args: FetchArgs) -> Result<()> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let cache_dir = args.cache_dir.unwrap_or_else(|| cfg.cache_dir.clone());
    let source = Arc::new(CurlSource::new(TransferOptions::from_config(&cfg)));
    let orchestrator = Orchestrator::new(source, CacheStore::new(cache_dir));
    let job = DownloadJob::new(args.urls, args.keep_chunks, args.output)?;

    let report = orchestrator.run(&job).await?;
    println!(
        "{}: {} bytes, {} chunks ({} cached, {} verified, {} mismatched, {} unverified)",
        report.output.display(),
        report.bytes_written,
        report.chunks,
        report.from_cache,
        report.verified,
        report.mismatched,
        report.unverified,
    );
    Ok(())
}

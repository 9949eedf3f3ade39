//! libcurl-backed `ChunkSource`.

use curl::easy::Easy;
use std::str;
use std::time::Duration;

use super::parse;
use super::ChunkSource;
use crate::chunk::ChunkMetadata;
use crate::config::ChunkcatConfig;
use crate::control::CancelSignal;
use crate::error::SourceError;

/// Per-request transfer settings applied to every easy handle.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub max_redirections: u32,
    pub user_agent: Option<String>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self::from_config(&ChunkcatConfig::default())
    }
}

impl TransferOptions {
    pub fn from_config(cfg: &ChunkcatConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            follow_redirects: cfg.follow_redirects,
            max_redirections: cfg.max_redirections,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurlSource {
    options: TransferOptions,
}

impl CurlSource {
    pub fn new(options: TransferOptions) -> Self {
        Self { options }
    }

    fn handle(&self, locator: &str) -> Result<Easy, curl::Error> {
        let mut easy = Easy::new();
        easy.url(locator)?;
        easy.follow_location(self.options.follow_redirects)?;
        easy.max_redirections(self.options.max_redirections)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        if let Some(t) = self.options.timeout {
            easy.timeout(t)?;
        }
        if let Some(ua) = &self.options.user_agent {
            easy.useragent(ua)?;
        }
        // Needed for the progress callback that polls the cancel signal.
        easy.progress(true)?;
        Ok(easy)
    }
}

/// A transfer aborted from our progress callback is a cancellation, not a transport failure.
fn perform_error(e: curl::Error, cancel: &CancelSignal) -> SourceError {
    if e.is_aborted_by_callback() && cancel.is_cancelled() {
        SourceError::Cancelled
    } else {
        SourceError::Transport(e)
    }
}

fn check_status(easy: &mut Easy) -> Result<(), SourceError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(SourceError::Status(code));
    }
    Ok(())
}

impl ChunkSource for CurlSource {
    fn resolve(&self, locator: &str, cancel: &CancelSignal) -> Result<ChunkMetadata, SourceError> {
        let mut headers: Vec<String> = Vec::new();
        let mut easy = self.handle(locator)?;
        easy.nobody(true)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.perform().map_err(|e| perform_error(e, cancel))?;
        }

        if let Err(e) = check_status(&mut easy) {
            tracing::error!(url = locator, error = %e, "invalid status code");
            return Err(e);
        }
        let meta = parse::parse_headers(&headers)?;
        tracing::debug!(url = locator, size = ?meta.size, hash = ?meta.digest, "chunk metadata");
        Ok(meta)
    }

    fn retrieve(&self, locator: &str, cancel: &CancelSignal) -> Result<Vec<u8>, SourceError> {
        let mut body: Vec<u8> = Vec::new();
        let mut easy = self.handle(locator)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.perform().map_err(|e| perform_error(e, cancel))?;
        }

        check_status(&mut easy)?;
        Ok(body)
    }
}

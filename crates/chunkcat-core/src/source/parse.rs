//! Parse HTTP response header lines into chunk metadata.

use crate::chunk::ChunkMetadata;
use crate::error::SourceError;

/// Parse collected header lines into `ChunkMetadata`.
///
/// Only the last response block counts: a status line (`HTTP/...`) resets what
/// was gathered, so headers of followed redirects are ignored.
pub(crate) fn parse_headers(lines: &[String]) -> Result<ChunkMetadata, SourceError> {
    let mut content_length: Option<&str> = None;
    let mut etag: Option<&str> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_length = None;
            etag = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = Some(value);
            } else if name.eq_ignore_ascii_case("etag") {
                etag = Some(value);
            }
        }
    }

    let size = match content_length {
        Some(v) => Some(
            v.parse::<u64>()
                .map_err(|_| SourceError::MalformedSize(v.to_string()))?,
        ),
        None => None,
    };
    let digest = etag
        .map(|v| v.trim_matches('"'))
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    Ok(ChunkMetadata { size, digest })
}

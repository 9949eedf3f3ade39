//! CLI for chunkcat.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_digest, run_fetch, FetchArgs};

/// Top-level CLI for chunkcat.
#[derive(Debug, Parser)]
#[command(name = "chunkcat")]
#[command(about = "chunkcat: fetch chunks concurrently and join them in order")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbose (debug-level) logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log to ~/.local/state/chunkcat/chunkcat.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download chunks in parallel and write them, in the given order, to one file.
    Fetch {
        /// Chunk URLs, in output order (at least two).
        #[arg(required = true, num_args = 2.., value_name = "URL")]
        urls: Vec<String>,

        /// Keep downloaded chunks in the cache dir and reuse them on later runs.
        #[arg(long)]
        keep_chunks: bool,

        /// Output file.
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        /// Chunk cache directory (overrides config; default ./cache).
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
    },

    /// Compute the digest of a local file.
    Digest {
        /// Path to the file.
        path: PathBuf,

        /// md5, sha1 or sha256.
        #[arg(long, default_value = "sha256")]
        algorithm: String,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run(self) -> Result<()> {
        match self {
            CliCommand::Fetch {
                urls,
                keep_chunks,
                output,
                cache_dir,
            } => {
                run_fetch(FetchArgs {
                    urls,
                    keep_chunks,
                    output,
                    cache_dir,
                })
                .await?
            }
            CliCommand::Digest { path, algorithm } => run_digest(&path, &algorithm)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

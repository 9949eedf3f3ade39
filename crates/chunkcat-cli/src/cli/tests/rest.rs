//! Tests for digest and completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_digest_default_algorithm() {
    match parse(&["chunkcat", "digest", "/path/to/file.bin"]) {
        CliCommand::Digest { path, algorithm } => {
            assert_eq!(path, Path::new("/path/to/file.bin"));
            assert_eq!(algorithm, "sha256");
        }
        _ => panic!("expected Digest"),
    }
}

#[test]
fn cli_parse_digest_md5() {
    match parse(&["chunkcat", "digest", "x", "--algorithm", "md5"]) {
        CliCommand::Digest { algorithm, .. } => assert_eq!(algorithm, "md5"),
        _ => panic!("expected Digest"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["chunkcat", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_log_file_flag() {
    let cli = Cli::try_parse_from(["chunkcat", "--log-file", "digest", "f"]).unwrap();
    assert!(cli.log_file);
}

#[test]
fn cli_command_is_well_formed() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

//! CLI command handlers, one per file.

mod completions;
mod digest;
mod fetch;

pub use completions::run_completions;
pub use digest::run_digest;
pub use fetch::{run_fetch, FetchArgs};

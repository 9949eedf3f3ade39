use chunkcat_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_file {
        if let Err(e) = logging::init_file_logging(cli.debug) {
            logging::init_logging_stderr(cli.debug);
            tracing::warn!("file logging unavailable ({:#}), logging to stderr", e);
        }
    } else {
        logging::init_logging_stderr(cli.debug);
    }

    if let Err(err) = cli.command.run().await {
        eprintln!("chunkcat error: {:#}", err);
        std::process::exit(1);
    }
}

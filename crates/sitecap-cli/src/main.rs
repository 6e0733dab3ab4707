use clap::Parser;
use sitecap_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; the file sink falls back to stderr.
    if cli.log_file {
        if let Err(err) = logging::init_logging() {
            match logging::init_logging_stderr() {
                Ok(()) => tracing::warn!("file logging unavailable ({:#}); logging to stderr", err),
                Err(e) => eprintln!("sitecap: logging disabled: {:#}; {:#}", err, e),
            }
        }
    } else if let Err(err) = logging::init_logging_stderr() {
        eprintln!("sitecap: logging disabled: {:#}", err);
    }

    if let Err(err) = cli.run().await {
        eprintln!("sitecap error: {:#}", err);
        std::process::exit(1);
    }
}

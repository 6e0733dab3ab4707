//! CLI for sitecap.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitecap_core::config::{self, CaptureConfig};
use std::path::PathBuf;

use commands::{run_capture, run_completions, run_show_config, CaptureOverrides};

/// Top-level CLI for sitecap.
#[derive(Debug, Parser)]
#[command(name = "sitecap", version)]
#[command(about = "sitecap: save web pages and their relative assets for offline viewing", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/sitecap/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log to ~/.local/state/sitecap/sitecap.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Capture one or more pages into <output-dir>/downloads/<hostname>/.
    Capture {
        /// HTTP/HTTPS page addresses.
        addresses: Vec<String>,

        /// Directory that receives downloads/ (default: current directory).
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Capture up to N sites concurrently.
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Fetch up to N assets per site concurrently.
        #[arg(long, value_name = "N")]
        asset_jobs: Option<usize>,

        /// Per-request timeout in seconds (page and each asset).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Save only index.html and metadata.txt.
        #[arg(long)]
        no_assets: bool,

        /// Refuse to run when the address count is outside the configured bounds.
        #[arg(long)]
        strict: bool,
    },

    /// Show the configuration file path and effective settings.
    Config,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn load_config(&self) -> Result<CaptureConfig> {
        let cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            CliCommand::Capture {
                addresses,
                output_dir,
                jobs,
                asset_jobs,
                timeout,
                no_assets,
                strict,
            } => {
                let cfg = self.load_config()?;
                let output_root = match output_dir {
                    Some(dir) => dir.clone(),
                    None => std::env::current_dir()?,
                };
                let overrides = CaptureOverrides {
                    jobs: *jobs,
                    asset_jobs: *asset_jobs,
                    timeout_secs: *timeout,
                    no_assets: *no_assets,
                    strict: *strict,
                };
                run_capture(addresses, overrides.apply(cfg), output_root).await?;
            }
            CliCommand::Config => {
                let cfg = self.load_config()?;
                let path = match &self.config {
                    Some(path) => path.clone(),
                    None => config::config_path()?,
                };
                run_show_config(&path, &cfg)?;
            }
            CliCommand::Completions { shell } => run_completions(*shell),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

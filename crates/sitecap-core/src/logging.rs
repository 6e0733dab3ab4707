//! Logging init: console (stderr) by default, or an append-only file under the XDG state dir.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used for the log file when `RUST_LOG` is unset.
const FILE_FILTER: &str = "info,sitecap=debug,sitecap_core=debug";
/// Filter used for console output when `RUST_LOG` is unset.
const CONSOLE_FILTER: &str = "info";

/// Path of the log file: `~/.local/state/sitecap/sitecap.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sitecap")?;
    Ok(xdg_dirs.get_state_home().join("sitecap").join("sitecap.log"))
}

/// Initialize logging to the state-dir log file.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let log_file_path = log_file_path()?;
    if let Some(dir) = log_file_path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FILE_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("sitecap logging initialized at {}", log_file_path.display());
    Ok(())
}

/// Initialize logging to stderr only. Default for the CLI, and the fallback when
/// `init_logging()` fails. Errs if a global subscriber is already installed.
pub fn init_logging_stderr() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CONSOLE_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))
}

//! CLI command handlers.

mod capture;
mod completions;
mod config;

pub use capture::{run_capture, CaptureOverrides};
pub use completions::run_completions;
pub use config::run_show_config;

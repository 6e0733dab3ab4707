//! `sitecap config` – print where the config lives and what is in effect.

use anyhow::Result;
use sitecap_core::config::CaptureConfig;
use std::path::Path;

pub fn run_show_config(path: &Path, cfg: &CaptureConfig) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    let http = cfg.http_config();
    if cfg.http.is_none() {
        println!();
        println!("# [http] defaults");
        print!("{}", toml::to_string_pretty(&http)?);
    }
    Ok(())
}

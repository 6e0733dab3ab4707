use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP client parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Wall-clock limit for one whole GET (page or asset).
    pub request_timeout_secs: u64,
    /// Redirects followed before a fetch fails.
    pub max_redirects: u32,
    /// Optional User-Agent header; libcurl sends none when unset.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// What to do when the number of addresses falls outside `[min_addresses, max_addresses]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressCountPolicy {
    /// Log a warning and capture whatever was given.
    #[default]
    Warn,
    /// Refuse to start the batch.
    Reject,
}

/// Global configuration loaded from `~/.config/sitecap/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Maximum number of sites captured at once.
    pub max_concurrent_sites: usize,
    /// Maximum number of asset GETs in flight per site.
    pub max_concurrent_assets: usize,
    /// Download images, stylesheets and scripts referenced by each page.
    pub download_assets: bool,
    /// Fewest addresses a batch expects.
    pub min_addresses: usize,
    /// Most addresses a batch expects.
    pub max_addresses: usize,
    #[serde(default)]
    pub address_count_policy: AddressCountPolicy,
    /// URL schemes accepted for page addresses.
    pub allowed_schemes: Vec<String>,
    /// Optional HTTP settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sites: 8,
            max_concurrent_assets: 4,
            download_assets: true,
            min_addresses: 1,
            max_addresses: 100,
            address_count_policy: AddressCountPolicy::Warn,
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            http: None,
        }
    }
}

impl CaptureConfig {
    /// HTTP settings from the file, or defaults.
    pub fn http_config(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sitecap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CaptureConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CaptureConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file (e.g. `--config`).
pub fn load_from_path(path: &Path) -> Result<CaptureConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: CaptureConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

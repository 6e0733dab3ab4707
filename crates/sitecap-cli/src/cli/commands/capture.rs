//! `sitecap capture <address>...` – run one batch.

use anyhow::Result;
use sitecap_core::batch;
use sitecap_core::config::{AddressCountPolicy, CaptureConfig, HttpConfig};
use std::path::PathBuf;

/// Command-line values that take precedence over config.toml.
#[derive(Debug, Clone, Default)]
pub struct CaptureOverrides {
    pub jobs: Option<usize>,
    pub asset_jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub no_assets: bool,
    pub strict: bool,
}

impl CaptureOverrides {
    pub fn apply(&self, mut cfg: CaptureConfig) -> CaptureConfig {
        if let Some(n) = self.jobs {
            cfg.max_concurrent_sites = n.max(1);
        }
        if let Some(n) = self.asset_jobs {
            cfg.max_concurrent_assets = n.max(1);
        }
        if let Some(secs) = self.timeout_secs {
            let mut http = cfg.http.take().unwrap_or_else(HttpConfig::default);
            http.request_timeout_secs = secs;
            cfg.http = Some(http);
        }
        if self.no_assets {
            cfg.download_assets = false;
        }
        if self.strict {
            cfg.address_count_policy = AddressCountPolicy::Reject;
        }
        cfg
    }
}

pub async fn run_capture(addresses: &[String], cfg: CaptureConfig, output_root: PathBuf) -> Result<()> {
    tracing::info!(
        "sitecap {} starting ({} address(es))",
        env!("CARGO_PKG_VERSION"),
        addresses.len()
    );
    let report = batch::run(addresses, &cfg, output_root).await?;

    for entry in &report.invalid {
        println!("{}: skipped ({})", entry.raw, entry.reason);
    }
    for site in &report.sites {
        println!("{}", site.summary_line());
    }
    // Per-site failures are reported above; the batch itself succeeded.
    println!("Success");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let overrides = CaptureOverrides {
            jobs: Some(3),
            asset_jobs: Some(0),
            timeout_secs: Some(7),
            no_assets: true,
            strict: true,
        };
        let cfg = overrides.apply(CaptureConfig::default());
        assert_eq!(cfg.max_concurrent_sites, 3);
        assert_eq!(cfg.max_concurrent_assets, 1);
        assert_eq!(cfg.http_config().request_timeout_secs, 7);
        assert!(!cfg.download_assets);
        assert_eq!(cfg.address_count_policy, AddressCountPolicy::Reject);
    }

    #[test]
    fn no_overrides_keep_config() {
        let cfg = CaptureOverrides::default().apply(CaptureConfig::default());
        assert_eq!(cfg.max_concurrent_sites, 8);
        assert!(cfg.download_assets);
        assert!(cfg.http.is_none());
        assert_eq!(cfg.address_count_policy, AddressCountPolicy::Warn);
    }
}

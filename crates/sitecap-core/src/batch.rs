//! Batch runner: validate a list of addresses and capture the valid ones concurrently.
//!
//! Keeps up to `max_concurrent_sites` captures in flight; when one finishes the
//! next target starts, until all targets are done. One site's failure never
//! affects another's.

use std::path::PathBuf;
use std::sync::Arc;

use crate::capture::{CaptureOptions, SiteCapturer, SiteReport};
use crate::config::{AddressCountPolicy, CaptureConfig};
use crate::http::HttpClient;
use crate::target::{self, InvalidAddress, SiteTarget};

/// Errors that stop a batch before any capture starts.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("expected between {min} and {max} addresses, got {count}")]
    AddressCount { count: usize, min: usize, max: usize },
}

/// An address that did not validate.
#[derive(Debug)]
pub struct InvalidEntry {
    pub raw: String,
    pub reason: InvalidAddress,
}

/// Outcome of a whole batch. Informational: the batch itself always succeeds
/// once it has started.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub invalid: Vec<InvalidEntry>,
    pub sites: Vec<SiteReport>,
}

impl BatchReport {
    pub fn captured(&self) -> usize {
        self.sites.iter().filter(|s| s.is_done()).count()
    }

    pub fn failed(&self) -> usize {
        self.sites.len() - self.captured()
    }
}

/// Checks the address count against `[min, max]`. Under [`AddressCountPolicy::Warn`]
/// an out-of-range count is only logged.
pub fn check_address_count(count: usize, cfg: &CaptureConfig) -> Result<(), BatchError> {
    let (min, max) = (cfg.min_addresses, cfg.max_addresses);
    if (min..=max).contains(&count) {
        return Ok(());
    }
    let err = BatchError::AddressCount { count, min, max };
    match cfg.address_count_policy {
        AddressCountPolicy::Warn => {
            tracing::warn!("{}; continuing", err);
            Ok(())
        }
        AddressCountPolicy::Reject => Err(err),
    }
}

/// Splits raw addresses into valid targets and rejected entries, logging a
/// warning per rejection. Order of `targets` follows the input.
pub fn validate_addresses<S: AsRef<str>>(
    raw: &[S],
    allowed_schemes: &[String],
) -> (Vec<SiteTarget>, Vec<InvalidEntry>) {
    let mut targets = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for address in raw {
        let address = address.as_ref();
        match target::validate(address, allowed_schemes) {
            Ok(t) => targets.push(t),
            Err(reason) => {
                tracing::warn!("skipping invalid address {:?}: {}", address, reason);
                invalid.push(InvalidEntry {
                    raw: address.to_string(),
                    reason,
                });
            }
        }
    }
    (targets, invalid)
}

/// Captures `targets` with up to `max_concurrent_sites` in flight and waits for all.
/// Reports are in completion order.
pub async fn capture_all(
    capturer: Arc<SiteCapturer>,
    targets: Vec<SiteTarget>,
    max_concurrent_sites: usize,
) -> Vec<SiteReport> {
    let max_concurrent = max_concurrent_sites.max(1);
    let mut reports = Vec::with_capacity(targets.len());
    let mut queue = targets.into_iter();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some(target) = queue.next() else {
                break;
            };
            let capturer = Arc::clone(&capturer);
            join_set.spawn(async move { capturer.capture(target).await });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("site task join: {}", e),
        }
    }

    reports
}

/// Validates `raw` and captures every valid address under `output_root`.
pub async fn run<S: AsRef<str>>(
    raw: &[S],
    cfg: &CaptureConfig,
    output_root: PathBuf,
) -> Result<BatchReport, BatchError> {
    check_address_count(raw.len(), cfg)?;

    let (targets, invalid) = validate_addresses(raw, &cfg.allowed_schemes);
    tracing::info!(
        "capturing {} site(s) ({} invalid address(es) skipped)",
        targets.len(),
        invalid.len()
    );

    let client = HttpClient::new(&cfg.http_config());
    let capturer = Arc::new(SiteCapturer::new(
        client,
        CaptureOptions::from_config(cfg, output_root),
    ));
    let sites = capture_all(capturer, targets, cfg.max_concurrent_sites).await;

    let report = BatchReport { invalid, sites };
    tracing::info!(
        "batch finished: {} captured, {} failed",
        report.captured(),
        report.failed()
    );
    Ok(report)
}

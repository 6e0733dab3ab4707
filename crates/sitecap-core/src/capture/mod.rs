//! Per-site capture pipeline.
//!
//! Fetching → Persisting → ExtractingMetadata → DownloadingAssets → Done, with
//! failure isolated per stage: only a failed page fetch or an unusable mirror
//! directory abandons the site. Metadata and individual asset failures are
//! logged and the pipeline moves on.

mod assets;
mod report;

pub use assets::{fetch_asset, AssetError};
pub use report::{AssetTally, CaptureStage, SiteOutcome, SiteReport};

use std::borrow::Cow;
use std::path::PathBuf;

use crate::config::CaptureConfig;
use crate::extract::{self, Extraction};
use crate::http::HttpClient;
use crate::metadata::MetadataRecord;
use crate::storage::MirrorDirectory;
use crate::target::SiteTarget;
use crate::url_model::{self, NotCapturable, ResolvedAsset};

/// Knobs for one capture, usually derived from [`CaptureConfig`].
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Directory that holds `downloads/`.
    pub output_root: PathBuf,
    pub download_assets: bool,
    pub max_concurrent_assets: usize,
}

impl CaptureOptions {
    pub fn from_config(cfg: &CaptureConfig, output_root: PathBuf) -> Self {
        Self {
            output_root,
            download_assets: cfg.download_assets,
            max_concurrent_assets: cfg.max_concurrent_assets,
        }
    }
}

/// A fetched page, held only while metadata and assets are derived from it.
#[derive(Debug, Clone)]
pub struct PageCapture {
    /// Address the body was served from: the requested one, or its
    /// same-origin redirect target.
    pub target: SiteTarget,
    /// Raw response bytes, written verbatim to `index.html`.
    pub body: Vec<u8>,
}

impl PageCapture {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Runs site captures with a shared HTTP client and options.
#[derive(Debug, Clone)]
pub struct SiteCapturer {
    client: HttpClient,
    opts: CaptureOptions,
}

impl SiteCapturer {
    pub fn new(client: HttpClient, opts: CaptureOptions) -> Self {
        Self { client, opts }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.opts
    }

    /// Captures one site. Never returns an error: the report says how far it got.
    pub async fn capture(&self, target: SiteTarget) -> SiteReport {
        let mut report = SiteReport::new(target.clone());
        let mirror = MirrorDirectory::for_target(&self.opts.output_root, &target);

        tracing::info!(site = %target, "fetching page");
        let page = match self.client.get(target.url()).await {
            Ok(fetched) => {
                // References in the body are relative to where it was served from.
                let served_from = match fetched.effective_url.as_deref() {
                    Some(effective) => match target.redirected_to(effective) {
                        Some(moved) => {
                            tracing::debug!(site = %target, "redirected to {}", moved);
                            moved
                        }
                        None => {
                            if effective != target.as_str() {
                                tracing::debug!(
                                    site = %target,
                                    "redirected off-origin to {}; resolving against the address",
                                    effective
                                );
                            }
                            target.clone()
                        }
                    },
                    None => target.clone(),
                };
                PageCapture {
                    target: served_from,
                    body: fetched.bytes,
                }
            }
            Err(e) => return report.failed(CaptureStage::Fetching, e),
        };

        report.enter(CaptureStage::Persisting);
        if let Err(e) = mirror.ensure().await {
            let reason = format!("create {}: {}", mirror.path().display(), e);
            return report.failed(CaptureStage::Persisting, reason);
        }
        match mirror.write_index(&page.body).await {
            Ok(()) => {
                report.index_written = true;
                tracing::info!(site = %target, "page saved to {}", mirror.index_path().display());
            }
            Err(e) => tracing::warn!(
                site = %target,
                "could not write {}: {}",
                mirror.index_path().display(),
                e
            ),
        }

        report.enter(CaptureStage::ExtractingMetadata);
        let extraction = match extract_blocking(&page).await {
            Ok(extraction) => {
                let record = MetadataRecord::new(target.as_str(), extraction.stats);
                match mirror.write_metadata(&record.render()).await {
                    Ok(()) => {
                        report.metadata_written = true;
                        tracing::info!(
                            site = %target,
                            "metadata saved ({} links, {} images)",
                            extraction.stats.link_count,
                            extraction.stats.image_count
                        );
                    }
                    Err(e) => tracing::warn!(
                        site = %target,
                        "could not write {}: {}",
                        mirror.metadata_path().display(),
                        e
                    ),
                }
                Some(extraction)
            }
            Err(e) => {
                tracing::warn!(site = %target, "metadata extraction failed: {}", e);
                None
            }
        };

        if !self.opts.download_assets {
            tracing::debug!(site = %target, "asset download disabled");
            report.enter(CaptureStage::Done);
            return report;
        }

        report.enter(CaptureStage::DownloadingAssets);
        let extraction = match extraction {
            Some(extraction) => extraction,
            None => match extract_blocking(&page).await {
                Ok(extraction) => extraction,
                Err(e) => return report.failed(CaptureStage::DownloadingAssets, e),
            },
        };

        let (resolved, skipped) = resolve_all(&page.target, &extraction);
        report.assets.skipped = skipped;
        let (saved, failed) = assets::download_all(
            &self.client,
            mirror.path(),
            resolved,
            self.opts.max_concurrent_assets,
        )
        .await;
        report.assets.saved = saved;
        report.assets.failed = failed;
        tracing::info!(
            site = %target,
            "assets: {} saved, {} failed, {} skipped",
            saved,
            failed,
            skipped
        );

        report.enter(CaptureStage::Done);
        report
    }
}

/// Parses the page on the blocking pool.
async fn extract_blocking(page: &PageCapture) -> anyhow::Result<Extraction> {
    let text = page.text().into_owned();
    tokio::task::spawn_blocking(move || extract::extract(&text))
        .await
        .map_err(|e| anyhow::anyhow!("extract task join: {}", e))
}

/// Resolves every reference; returns the capturable ones and how many were skipped.
fn resolve_all(target: &SiteTarget, extraction: &Extraction) -> (Vec<ResolvedAsset>, usize) {
    let mut resolved = Vec::with_capacity(extraction.links.len());
    let mut skipped = 0usize;
    for reference in &extraction.links {
        match url_model::resolve(target, &reference.path) {
            Ok(asset) => resolved.push(asset),
            Err(reason @ NotCapturable::EscapesMirror) => {
                skipped += 1;
                tracing::warn!(
                    site = %target,
                    "skipping {} {:?}: {}",
                    reference.kind,
                    reference.path,
                    reason
                );
            }
            Err(reason) => {
                skipped += 1;
                tracing::debug!(
                    site = %target,
                    "not capturing {} {:?}: {}",
                    reference.kind,
                    reference.path,
                    reason
                );
            }
        }
    }
    (resolved, skipped)
}

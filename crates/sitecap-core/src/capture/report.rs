//! Capture stages and the per-site report.

use std::fmt;

use crate::target::SiteTarget;

/// Pipeline stage of one site capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Fetching,
    Persisting,
    ExtractingMetadata,
    DownloadingAssets,
    Done,
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaptureStage::Fetching => "fetching",
            CaptureStage::Persisting => "persisting",
            CaptureStage::ExtractingMetadata => "extracting metadata",
            CaptureStage::DownloadingAssets => "downloading assets",
            CaptureStage::Done => "done",
        })
    }
}

/// Terminal state of a site capture. Neither is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    Done,
    /// Abandoned at `stage`.
    Failed { stage: CaptureStage, reason: String },
}

/// Asset counts for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetTally {
    /// Written under the mirror directory.
    pub saved: usize,
    /// Fetch or write failed.
    pub failed: usize,
    /// Not capturable (absolute, cross-origin, escaping, ...).
    pub skipped: usize,
}

/// What happened to one site.
#[derive(Debug, Clone)]
pub struct SiteReport {
    pub target: SiteTarget,
    /// Last stage entered.
    pub stage: CaptureStage,
    pub outcome: SiteOutcome,
    pub index_written: bool,
    pub metadata_written: bool,
    pub assets: AssetTally,
}

impl SiteReport {
    pub(super) fn new(target: SiteTarget) -> Self {
        Self {
            target,
            stage: CaptureStage::Fetching,
            outcome: SiteOutcome::Done,
            index_written: false,
            metadata_written: false,
            assets: AssetTally::default(),
        }
    }

    pub(super) fn enter(&mut self, stage: CaptureStage) {
        tracing::debug!(site = %self.target, "{} -> {}", self.stage, stage);
        self.stage = stage;
    }

    pub(super) fn failed(mut self, stage: CaptureStage, reason: impl fmt::Display) -> Self {
        tracing::warn!(site = %self.target, "capture failed while {}: {}", stage, reason);
        self.outcome = SiteOutcome::Failed {
            stage,
            reason: reason.to_string(),
        };
        self
    }

    pub fn is_done(&self) -> bool {
        self.outcome == SiteOutcome::Done
    }

    /// One line for the console summary.
    pub fn summary_line(&self) -> String {
        match &self.outcome {
            SiteOutcome::Done => format!(
                "{}: captured ({} assets saved, {} failed, {} skipped{})",
                self.target,
                self.assets.saved,
                self.assets.failed,
                self.assets.skipped,
                if self.metadata_written { "" } else { "; no metadata" },
            ),
            SiteOutcome::Failed { stage, reason } => {
                format!("{}: failed while {}: {}", self.target, stage, reason)
            }
        }
    }
}

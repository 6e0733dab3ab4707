//! Disk layout and file lifecycle.
//!
//! Every file is written to a sibling temp file and atomically renamed over the
//! final name, so readers never see a half-written page and two writers of the
//! same path simply race to last-write-wins.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::target::SiteTarget;

/// Captured page body.
pub const INDEX_FILE: &str = "index.html";
/// Plain-text summary of the capture.
pub const METADATA_FILE: &str = "metadata.txt";

/// Writes `bytes` to `path`, creating missing parent directories and replacing
/// any existing file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".sitecap-")
        .suffix(".part")
        .tempfile_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Async wrapper around [`write_atomic`] on the blocking pool.
pub async fn write_atomic_async(path: PathBuf, bytes: Vec<u8>) -> io::Result<()> {
    tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?
}

/// On-disk root for one hostname: `<root>/downloads/<hostname>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorDirectory {
    path: PathBuf,
}

impl MirrorDirectory {
    pub fn for_target(root: &Path, target: &SiteTarget) -> Self {
        Self {
            path: target.mirror_dir(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index_path(&self) -> PathBuf {
        self.path.join(INDEX_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }

    /// Creates the directory if absent; an existing one is reused as-is.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.path).await
    }

    pub async fn write_index(&self, body: &[u8]) -> io::Result<()> {
        write_atomic_async(self.index_path(), body.to_vec()).await
    }

    pub async fn write_metadata(&self, text: &str) -> io::Result<()> {
        write_atomic_async(self.metadata_path(), text.as_bytes().to_vec()).await
    }
}

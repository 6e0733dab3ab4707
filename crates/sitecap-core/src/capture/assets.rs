//! Asset fetching: one GET plus one atomic write per resolved reference, run
//! through a bounded pool so a page with many assets cannot open unbounded
//! connections.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http::{FetchError, HttpClient};
use crate::storage;
use crate::url_model::ResolvedAsset;

/// Why one asset was not saved.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// True when the asset's server could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, AssetError::Fetch { source, .. } if source.is_network())
    }
}

/// Fetches `asset` and writes it under `mirror_dir`, creating intermediate
/// directories and overwriting any existing file. Returns bytes written.
pub async fn fetch_asset(
    client: &HttpClient,
    asset: &ResolvedAsset,
    mirror_dir: &Path,
) -> Result<usize, AssetError> {
    let body = client
        .get(&asset.fetch_url)
        .await
        .map_err(|source| AssetError::Fetch {
            url: asset.fetch_url.to_string(),
            source,
        })?;
    let dest = asset.destination(mirror_dir);
    let len = body.bytes.len();
    storage::write_atomic_async(dest.clone(), body.bytes)
        .await
        .map_err(|source| AssetError::Persist { path: dest, source })?;
    Ok(len)
}

/// Downloads every asset with at most `max_concurrent` in flight.
/// Failures are logged and counted; they never stop sibling downloads.
/// Returns `(saved, failed)`.
pub(super) async fn download_all(
    client: &HttpClient,
    mirror_dir: &Path,
    assets: Vec<ResolvedAsset>,
    max_concurrent: usize,
) -> (usize, usize) {
    let max_concurrent = max_concurrent.max(1);
    let client = Arc::new(client.clone());
    let mirror_dir: Arc<Path> = Arc::from(mirror_dir);
    let mut queue = assets.into_iter();
    let mut join_set = tokio::task::JoinSet::new();
    let (mut saved, mut failed) = (0usize, 0usize);

    loop {
        while join_set.len() < max_concurrent {
            let Some(asset) = queue.next() else {
                break;
            };
            let client = Arc::clone(&client);
            let mirror_dir = Arc::clone(&mirror_dir);
            join_set.spawn(async move {
                let res = fetch_asset(&client, &asset, &mirror_dir).await;
                (asset, res)
            });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        match joined {
            Ok((asset, Ok(len))) => {
                saved += 1;
                tracing::debug!(
                    "saved {} ({} bytes) -> {}",
                    asset.fetch_url,
                    len,
                    asset.local_path.display()
                );
            }
            Ok((_, Err(e))) if e.is_network() => {
                failed += 1;
                tracing::warn!("asset unreachable: {}", e);
            }
            Ok((_, Err(e))) => {
                failed += 1;
                tracing::info!("asset not saved: {}", e);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("asset task join: {}", e);
            }
        }
    }

    (saved, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{validate, DEFAULT_SCHEMES};
    use crate::url_model::resolve;

    #[tokio::test]
    async fn refused_fetch_is_reported_not_panicked() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let page = validate(&format!("http://127.0.0.1:{}/", port), DEFAULT_SCHEMES).unwrap();
        let asset = resolve(&page, "/img/a.png").unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = fetch_asset(&HttpClient::default(), &asset, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Fetch { .. }));
        assert!(err.is_network());
        assert!(!dir.path().join("img/a.png").exists());

        let (saved, failed) =
            download_all(&HttpClient::default(), dir.path(), vec![asset.clone(), asset], 1).await;
        assert_eq!((saved, failed), (0, 2));
    }

    #[test]
    fn status_and_write_failures_are_not_network() {
        let status = AssetError::Fetch {
            url: "http://example.com/a.png".to_string(),
            source: FetchError::Http(404),
        };
        assert!(!status.is_network());
        let write = AssetError::Persist {
            path: PathBuf::from("/x/a.png"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(!write.is_network());
        assert_eq!(write.to_string(), "write /x/a.png: disk full");
    }

    #[tokio::test]
    async fn empty_asset_list() {
        let dir = tempfile::tempdir().unwrap();
        let (saved, failed) = download_all(&HttpClient::default(), dir.path(), Vec::new(), 4).await;
        assert_eq!((saved, failed), (0, 0));
    }
}

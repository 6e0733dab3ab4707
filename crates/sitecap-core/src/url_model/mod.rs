//! Asset reference resolution.
//!
//! Decides whether a `src`/`href` value found in a page is capturable and, if
//! so, derives the absolute URL to fetch and the local path to store it under.
//! Local paths are confined to the mirror directory.

mod path;
mod sanitize;

pub use path::confine_to_mirror;
pub use sanitize::sanitize_segment;

use std::path::{Path, PathBuf};
use url::Url;

use crate::target::SiteTarget;

/// Files at the mirror root that belong to the page capture itself.
pub const RESERVED_NAMES: &[&str] = &["index.html", "metadata.txt"];

/// Why a reference is skipped. Not an error for the capture.
#[derive(Debug, thiserror::Error)]
pub enum NotCapturable {
    #[error("empty reference")]
    Empty,
    #[error("absolute network reference")]
    AbsoluteNetwork,
    #[error("cannot resolve against page URL: {0}")]
    Unresolvable(#[from] url::ParseError),
    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("different origin `{0}`")]
    CrossOrigin(String),
    #[error("path escapes the mirror directory")]
    EscapesMirror,
    #[error("would overwrite `{0}`")]
    Reserved(String),
}

/// A capturable reference: where to fetch it and where to keep it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Absolute URL, fragment stripped, query kept.
    pub fetch_url: Url,
    /// Relative path under the mirror directory, query and fragment stripped.
    pub local_path: PathBuf,
}

impl ResolvedAsset {
    /// Absolute destination under `mirror_dir`.
    pub fn destination(&self, mirror_dir: &Path) -> PathBuf {
        mirror_dir.join(&self.local_path)
    }
}

/// Resolves `reference` found on `page`.
///
/// References starting with `http` are left alone (not downloaded). Others are
/// joined to the page URL; the result must stay on the page's origin. The local
/// path is the reference's own path, rooted at the mirror, so relative links in
/// the saved `index.html` line up with the stored files.
pub fn resolve(page: &SiteTarget, reference: &str) -> Result<ResolvedAsset, NotCapturable> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(NotCapturable::Empty);
    }
    if reference.starts_with("http") {
        return Err(NotCapturable::AbsoluteNetwork);
    }

    let mut fetch_url = page.url().join(reference)?;
    fetch_url.set_fragment(None);

    let scheme = fetch_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(NotCapturable::UnsupportedScheme(scheme.to_string()));
    }
    if fetch_url.origin() != page.url().origin() {
        let host = fetch_url.host_str().unwrap_or_default().to_string();
        return Err(NotCapturable::CrossOrigin(host));
    }

    // Scheme-relative (`//host/path`): only the part after the authority is a path.
    let local_source = if reference.starts_with("//") || reference.starts_with("\\\\") {
        fetch_url.path().to_string()
    } else {
        path::path_part(reference).to_string()
    };
    let local_path = confine_to_mirror(&local_source)?;

    if let Some(name) = RESERVED_NAMES
        .iter()
        .find(|name| local_path == Path::new(name))
    {
        return Err(NotCapturable::Reserved((*name).to_string()));
    }

    Ok(ResolvedAsset {
        fetch_url,
        local_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{validate, DEFAULT_SCHEMES};
    use std::path::Component;

    fn page(url: &str) -> SiteTarget {
        validate(url, DEFAULT_SCHEMES).unwrap()
    }

    #[test]
    fn rooted_image_reference() {
        let r = resolve(&page("https://example.com/"), "/img/logo.png").unwrap();
        assert_eq!(r.fetch_url.as_str(), "https://example.com/img/logo.png");
        assert_eq!(r.local_path, Path::new("img/logo.png"));
        assert_eq!(
            r.destination(Path::new("/m/example.com")),
            Path::new("/m/example.com/img/logo.png")
        );
    }

    #[test]
    fn relative_reference_resolves_against_page_directory() {
        let r = resolve(
            &page("https://example.com/blog/post.html"),
            "img/a.png",
        )
        .unwrap();
        assert_eq!(r.fetch_url.as_str(), "https://example.com/blog/img/a.png");
        assert_eq!(r.local_path, Path::new("img/a.png"));
    }

    #[test]
    fn query_kept_for_fetch_fragment_dropped() {
        let r = resolve(&page("https://example.com/"), "css/site.css?v=2#x").unwrap();
        assert_eq!(r.fetch_url.as_str(), "https://example.com/css/site.css?v=2");
        assert_eq!(r.local_path, Path::new("css/site.css"));
    }

    #[test]
    fn absolute_network_references_skipped() {
        let p = page("https://example.com/");
        assert!(matches!(
            resolve(&p, "https://cdn.other.com/x.png"),
            Err(NotCapturable::AbsoluteNetwork)
        ));
        assert!(matches!(
            resolve(&p, "http://example.com/same-host.png"),
            Err(NotCapturable::AbsoluteNetwork)
        ));
    }

    #[test]
    fn empty_references_skipped() {
        let p = page("https://example.com/");
        assert!(matches!(resolve(&p, ""), Err(NotCapturable::Empty)));
        assert!(matches!(resolve(&p, "   "), Err(NotCapturable::Empty)));
        assert!(matches!(resolve(&p, "#top"), Err(NotCapturable::Empty)));
    }

    #[test]
    fn non_http_schemes_skipped() {
        let p = page("https://example.com/");
        assert!(matches!(
            resolve(&p, "data:image/png;base64,AAAA"),
            Err(NotCapturable::UnsupportedScheme(s)) if s == "data"
        ));
        assert!(matches!(
            resolve(&p, "javascript:void(0)"),
            Err(NotCapturable::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn scheme_relative_other_host_skipped() {
        let p = page("https://example.com/");
        assert!(matches!(
            resolve(&p, "//evil.example.com/x"),
            Err(NotCapturable::CrossOrigin(h)) if h == "evil.example.com"
        ));
    }

    #[test]
    fn scheme_relative_same_host_uses_url_path() {
        let r = resolve(&page("https://example.com/"), "//example.com/js/app.js").unwrap();
        assert_eq!(r.fetch_url.as_str(), "https://example.com/js/app.js");
        assert_eq!(r.local_path, Path::new("js/app.js"));
    }

    #[test]
    fn traversal_references_rejected() {
        let p = page("https://example.com/a/b/page.html");
        assert!(matches!(
            resolve(&p, "../../etc/passwd"),
            Err(NotCapturable::EscapesMirror)
        ));
        let r = resolve(&p, "/etc/passwd").unwrap();
        assert_eq!(r.local_path, Path::new("etc/passwd"));
    }

    #[test]
    fn reserved_names_not_overwritten() {
        let p = page("https://example.com/");
        assert!(matches!(
            resolve(&p, "/index.html"),
            Err(NotCapturable::Reserved(n)) if n == "index.html"
        ));
        assert!(matches!(
            resolve(&p, "metadata.txt?x=1"),
            Err(NotCapturable::Reserved(_))
        ));
        assert!(resolve(&p, "docs/index.html").is_ok());
    }

    #[test]
    fn resolved_paths_never_leave_mirror() {
        let p = page("https://example.com/deep/er/page.html");
        let refs = [
            "../../etc/passwd",
            "/etc/passwd",
            "//evil.example.com/x",
            "..\\..\\boot.ini",
            "./a/../../b",
            "%2e%2e/%2e%2e/x",
            "img/./../img/x.png",
            "/..",
        ];
        for r in refs {
            if let Ok(asset) = resolve(&p, r) {
                assert!(
                    asset
                        .local_path
                        .components()
                        .all(|c| matches!(c, Component::Normal(_))),
                    "{} -> {:?}",
                    r,
                    asset.local_path
                );
            }
        }
    }
}

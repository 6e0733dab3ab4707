//! Page address validation.
//!
//! Turns a raw address string into a [`SiteTarget`]: an absolute URL whose
//! scheme is in the allowed set. Pure; no network access.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Schemes accepted when the caller has no configured list.
pub const DEFAULT_SCHEMES: &[&str] = &["http", "https"];

/// Why an address was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum InvalidAddress {
    #[error("malformed URL: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("scheme `{0}:` is not allowed")]
    DisallowedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    /// Host cannot name a directory under `downloads/` (`.`, `..`, separators).
    #[error("host `{0}` cannot key a mirror directory")]
    UnusableHost(String),
}

/// A validated page address. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    url: Url,
}

impl SiteTarget {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Hostname that keys the mirror directory (no port).
    pub fn host(&self) -> &str {
        // validate() rejects URLs without a host.
        self.url.host_str().unwrap_or_default()
    }

    /// Mirror directory for this target: `<root>/downloads/<hostname>`.
    pub fn mirror_dir(&self, root: &Path) -> PathBuf {
        root.join("downloads").join(self.host())
    }

    /// The page as served after redirects, when `effective` stays on this
    /// target's origin. Cross-origin or unparsable locations give `None`.
    pub fn redirected_to(&self, effective: &str) -> Option<SiteTarget> {
        let url = Url::parse(effective).ok()?;
        if url.origin() != self.url.origin() || url == self.url {
            return None;
        }
        Some(SiteTarget { url })
    }
}

impl fmt::Display for SiteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Parses `raw` and checks its scheme against `allowed_schemes`.
///
/// Scheme tokens may be given with or without the trailing colon (`"https"` or
/// `"https:"`) and are compared case-insensitively.
pub fn validate<S: AsRef<str>>(
    raw: &str,
    allowed_schemes: &[S],
) -> Result<SiteTarget, InvalidAddress> {
    let url = Url::parse(raw)?;
    let scheme = url.scheme();
    let allowed = allowed_schemes
        .iter()
        .map(|s| s.as_ref().trim().trim_end_matches(':'))
        .any(|s| s.eq_ignore_ascii_case(scheme));
    if !allowed {
        return Err(InvalidAddress::DisallowedScheme(scheme.to_string()));
    }
    match url.host_str() {
        Some(h) if !h.is_empty() => {
            if !is_single_dir_name(h) {
                return Err(InvalidAddress::UnusableHost(h.to_string()));
            }
            Ok(SiteTarget { url })
        }
        _ => Err(InvalidAddress::MissingHost),
    }
}

/// True when `host` joins onto `downloads/` as exactly one normal component.
fn is_single_dir_name(host: &str) -> bool {
    let mut components = Path::new(host).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

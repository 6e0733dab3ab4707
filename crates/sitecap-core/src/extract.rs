//! HTML asset discovery and page statistics.
//!
//! Uses the scraper crate (html5ever) so malformed real-world markup parses
//! the way a browser would instead of failing.

use scraper::{Html, Selector};
use std::fmt;

/// Element kinds the extractor looks at, in one selector so results keep document order.
const ELEMENTS: &str = "a, img, link, script";

/// What kind of element a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `<img src>`
    Image,
    /// `<link href>` (stylesheets, icons, fonts, ...)
    StylesheetOrFont,
    /// `<script src>`
    Script,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Image => "image",
            AssetKind::StylesheetOrFont => "stylesheet",
            AssetKind::Script => "script",
        })
    }
}

/// A `src`/`href` value found in the page, tagged with its element kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub kind: AssetKind,
    pub path: String,
}

/// Simple structural counts written to metadata.txt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    /// Number of `<a>` elements.
    pub link_count: usize,
    /// Number of `<img>` elements.
    pub image_count: usize,
}

/// Result of one pass over a page.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Asset references in document order, duplicates included.
    pub links: Vec<AssetReference>,
    pub stats: PageStats,
}

/// Parses `body` and collects asset references and counts.
///
/// Anchors are only counted. Elements without the relevant attribute still
/// count (for `<a>`/`<img>`) but yield no reference.
pub fn extract(body: &str) -> Extraction {
    let document = Html::parse_document(body);
    let mut out = Extraction::default();

    let selector = match Selector::parse(ELEMENTS) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("invalid element selector {:?}: {:?}", ELEMENTS, e);
            return out;
        }
    };

    for element in document.select(&selector) {
        let el = element.value();
        let (kind, attr) = match el.name() {
            "a" => {
                out.stats.link_count += 1;
                continue;
            }
            "img" => {
                out.stats.image_count += 1;
                (AssetKind::Image, "src")
            }
            "link" => (AssetKind::StylesheetOrFont, "href"),
            "script" => (AssetKind::Script, "src"),
            _ => continue,
        };
        if let Some(path) = el.attr(attr) {
            out.links.push(AssetReference {
                kind,
                path: path.to_string(),
            });
        }
    }

    out
}

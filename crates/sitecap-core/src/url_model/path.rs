//! Lexical confinement of reference paths under a mirror root.

use std::path::PathBuf;

use super::sanitize::sanitize_segment;
use super::NotCapturable;

/// Strips the query and fragment from a reference, leaving its path part.
pub(crate) fn path_part(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

fn is_current_dir(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

/// `..` in any of the spellings URL resolution treats as a parent segment.
fn is_parent_dir(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

/// Normalizes `path` into a relative path under the mirror root.
///
/// A leading `/` is rooted at the mirror, not at the filesystem root. Both `/`
/// and `\` separate segments; empty and `.` segments are dropped; `..` pops the
/// previous segment. Returns [`NotCapturable::EscapesMirror`] when a `..` would
/// climb above the root, and [`NotCapturable::Empty`] when nothing is left.
pub fn confine_to_mirror(path: &str) -> Result<PathBuf, NotCapturable> {
    let mut segments: Vec<String> = Vec::new();
    for segment in path.split(['/', '\\']) {
        if segment.is_empty() || is_current_dir(segment) {
            continue;
        }
        if is_parent_dir(segment) {
            if segments.pop().is_none() {
                return Err(NotCapturable::EscapesMirror);
            }
            continue;
        }
        let clean = sanitize_segment(segment);
        if clean.is_empty() {
            continue;
        }
        segments.push(clean);
    }

    if segments.is_empty() {
        return Err(NotCapturable::Empty);
    }
    Ok(segments.iter().collect())
}

//! Linux-safe path segment sanitization.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Sanitizes one path segment of an asset reference for use as a directory or file name.
///
/// - Replaces NUL, `\`, `:` and control characters with `_`
/// - Collapses consecutive replacement underscores
/// - Limits length to 255 bytes (Linux NAME_MAX)
///
/// Segment boundaries (`/`) and dot segments are handled by the caller; an
/// input of `"."` or `".."` is returned unchanged.
pub fn sanitize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut prev_replaced = false;

    for c in segment.chars() {
        if c == '\0' || c == '\\' || c == ':' || c.is_control() {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        } else {
            out.push(c);
            prev_replaced = false;
        }
    }

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out.truncate(take);
    }
    out
}

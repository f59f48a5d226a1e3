//! File name extraction from a source URL.

use url::Url;

/// Last non-empty path segment of `url`, for use as a file name hint.
///
/// Returns `None` for root or empty paths and for `.`/`..` segments.
/// Query strings and fragments are ignored.
pub fn filename_from_url_path(url: &Url) -> Option<String> {
    let segment = url.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

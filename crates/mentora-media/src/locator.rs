//! Delivery URL parsing

use url::Url;

use crate::error::{MediaError, Result};

/// Extract the stored object's public id from its delivery URL
///
/// Expects `.../upload/[v<version>/]<folder>/<name>.<ext>` and returns
/// `<folder>/<name>`.
pub fn public_id_from_url(locator: &str) -> Result<String> {
    let invalid = || MediaError::InvalidLocator(locator.to_string());

    let url = Url::parse(locator).map_err(|_| invalid())?;
    let mut segments = url
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty())
        .skip_while(|s| *s != "upload")
        .skip(1)
        .peekable();

    if segments.peek().is_some_and(|s| is_version(s)) {
        segments.next();
    }

    let mut parts: Vec<&str> = segments.collect();
    let last = parts.pop().ok_or_else(invalid)?;
    let name = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => last,
    };
    parts.push(name);

    Ok(parts.join("/"))
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

use crate::url::href::href_path;

/// Percent-decodes an entry name
///
/// Invalid UTF-8 sequences are replaced rather than rejected. `+` is kept
/// as-is since it is literal in URL paths.
///
/// # Examples
///
/// ```
/// use dirmap::url::decode_name;
///
/// assert_eq!(decode_name("My%20Movie"), "My Movie");
/// ```
pub fn decode_name(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}

/// Derives the display name of a listing entry from its raw href
///
/// The name is the last path segment of the href, with the folder separator
/// removed and percent-encoding decoded. Returns `None` when the href has no
/// usable segment.
pub fn entry_name(href: &str) -> Option<String> {
    let path = href_path(href.trim()).trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or(path);

    if segment.is_empty() {
        return None;
    }

    let name = decode_name(segment);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// Joins folder names into the display path used in progress events
pub fn path_string(path: &[String]) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.join("/")
    }
}

use url::Url;

/// Hrefs that never name a listing entry
const NAVIGATION_HREFS: &[&str] = &["", ".", "./", "..", "../", "/"];

/// Returns true if the href is a navigation link rather than a listing entry
///
/// Covers the parent and self references (`../`, `./`, bare `/`), the
/// column-sorting query links emitted by Apache (`?C=N;O=D`), in-page
/// anchors, and non-fetchable schemes.
///
/// # Examples
///
/// ```
/// use dirmap::url::is_navigation_href;
///
/// assert!(is_navigation_href("../"));
/// assert!(is_navigation_href("?C=M;O=A"));
/// assert!(!is_navigation_href("Movies/"));
/// ```
pub fn is_navigation_href(href: &str) -> bool {
    let href = href.trim();

    NAVIGATION_HREFS.contains(&href)
        || href.starts_with('?')
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
}

/// Returns true if the raw href names a folder (trailing path separator)
///
/// Query strings and fragments are ignored, so `Season%201/?C=N` is a folder.
pub fn is_folder_href(href: &str) -> bool {
    href_path(href.trim()).ends_with('/')
}

/// Resolves an href against the listing URL
///
/// Returns `None` for unparseable references and for anything that is not
/// http or https after resolution.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href.trim()).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Returns true if `target` is `folder` itself or one of its ancestor folders
///
/// Servers often link the parent directory with an absolute path
/// (`/Data/` from `/Data/movies/`), which `is_navigation_href` cannot see.
pub fn is_self_or_ancestor(folder: &Url, target: &Url) -> bool {
    if folder.origin() != target.origin() {
        return false;
    }

    let folder_path = folder.path();
    let target_path = target.path();

    if target_path == folder_path {
        return true;
    }

    target_path.ends_with('/') && folder_path.starts_with(target_path)
}

/// The path part of an href, without query or fragment
pub(crate) fn href_path(href: &str) -> &str {
    let end = href.find(|c: char| c == '?' || c == '#').unwrap_or(href.len());
    &href[..end]
}

// src/core/links.rs

/// Rewrite a root-relative href against `origin` (`https://host`, no trailing slash).
/// Absolute and other relative forms are returned as-is.
///
/// - `/ygkj/wqkjgg/ssq/` -> `https://host/ygkj/wqkjgg/ssq/`
/// - `//cdn.host/v.mp4`  -> `https://cdn.host/v.mp4` (scheme taken from origin)
pub fn absolutize(href: &str, origin: &str) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = origin.split_once("://").map(|(s, _)| s).unwrap_or("https");
        return format!("{scheme}://{rest}");
    }
    if href.starts_with('/') {
        return join!(origin.trim_end_matches('/'), href);
    }
    s!(href)
}

/// Raw `href` attribute to a usable link: trimmed, empty and `#` treated as absent.
pub fn clean_href(raw: &str) -> Option<&str> {
    let t = raw.trim();
    if t.is_empty() || t == "#" { None } else { Some(t) }
}

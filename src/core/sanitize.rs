// src/core/sanitize.rs

pub fn normalize_entities(s: &str) -> String {
    // html5ever already decodes entities; this catches double-escaped text
    s.replace("&nbsp;", " ").replace("&amp;", "&").replace('\u{a0}', " ")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Text content of a DOM node, cleaned for the extractors.
pub fn node_text(el: &scraper::ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    normalize_ws(&normalize_entities(&raw))
}

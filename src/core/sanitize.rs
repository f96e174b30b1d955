// src/core/sanitize.rs

use url::Url;

use crate::config::consts::DEFAULT_IMAGE_EXT;

/// Collapse runs of whitespace (including NBSP) to one space and trim.
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

/// Make `name` safe as a single path component.
/// Whitespace and separators become `_`, other punctuation is dropped,
/// runs of `_` collapse. Empty result → `fallback`.
pub fn file_stem(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '.' {
            out.push(ch);
            last_us = false;
        } else if ch.is_whitespace() || ch == '/' || ch == '\\' || ch == '_' {
            if !last_us { out.push('_'); last_us = true; }
        }
    }
    let out = out.trim_matches(|c| c == '_' || c == '.').to_string();
    if out.is_empty() { s!(fallback) } else { out }
}

/// Extension of the last path segment of `url`, with the dot (`.jpg`).
/// Falls back to `.jpg` when there is none.
pub fn url_ext(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|mut segs| segs.next_back())
        .unwrap_or("");
    match last.rfind('.') {
        Some(i) if i + 1 < last.len() && last[i + 1..].chars().all(|c| c.is_ascii_alphanumeric()) => {
            last[i..].to_ascii_lowercase()
        }
        _ => s!(DEFAULT_IMAGE_EXT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_ws_collapses_nbsp() {
        assert_eq!(normalize_ws("  After\u{a0}\u{a0}acetic \n acid "), "After acetic acid");
    }

    #[test]
    fn file_stem_variants() {
        assert_eq!(file_stem("After acetic acid", "x"), "After_acetic_acid");
        assert_eq!(file_stem("Lugol's iodine / green filter", "x"), "Lugols_iodine_green_filter");
        assert_eq!(file_stem("../..", "stage_1"), "stage_1");
        assert_eq!(file_stem("AABB", "x"), "AABB");
    }

    #[test]
    fn url_ext_variants() {
        let u = |s: &str| Url::parse(s).unwrap();
        assert_eq!(url_ext(&u("https://h/atlas/AABB1.JPG")), ".jpg");
        assert_eq!(url_ext(&u("https://h/img.png?x=1")), ".png");
        assert_eq!(url_ext(&u("https://h/image")), ".jpg");
        assert_eq!(url_ext(&u("https://h/dir/")), ".jpg");
    }
}

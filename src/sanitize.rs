// src/sanitize.rs
//! Item body cleanup: entity decoding, first-image extraction, tag stripping,
//! and a bounded plain-text excerpt.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Upper bound on excerpt length, in characters.
pub const MAX_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cleaned {
    pub excerpt: String,
    pub image_url: Option<String>,
}

fn re_img() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s>"']+))"#).unwrap()
    })
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Turn a raw item body into an excerpt plus the first embedded image, if any.
///
/// Order matters: entities are decoded *before* tags are stripped, otherwise
/// double-encoded markup (`&amp;lt;p&amp;gt;`) would survive as literal tags.
pub fn clean(raw: &str) -> Cleaned {
    // 1) HTML entity decode
    let decoded = html_escape::decode_html_entities(raw);

    // 2) First <img src>
    let image_url = re_img()
        .captures(&decoded)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    // 3) Strip tags, twice
    let once = re_tags().replace_all(&decoded, " ");
    let twice = re_tags().replace_all(&once, " ");

    // Stray brackets from unbalanced markup ("a < b") never reach the excerpt.
    let no_brackets = twice.replace(['<', '>'], " ");

    // 4) Collapse whitespace
    let collapsed = re_ws().replace_all(&no_brackets, " ");
    let trimmed = collapsed.trim();

    // 5) Length cap
    let excerpt = if trimmed.chars().count() > MAX_EXCERPT_CHARS {
        trimmed
            .chars()
            .take(MAX_EXCERPT_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string()
    } else {
        trimmed.to_string()
    };

    Cleaned { excerpt, image_url }
}

/// Media type for an enclosure, by file extension. Defaults to JPEG.
pub fn guess_image_mime(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else if path.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "image/jpeg"
    }
}

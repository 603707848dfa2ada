// src/ingest/formats/atom.rs
use chrono::{DateTime, Utc};

use crate::ingest::types::{Item, RawEntry};
use crate::ingest::xml::Element;

/// `rel="alternate"` link (rel defaults to alternate), else the first link's href.
fn pick_link(entry: &Element) -> Option<String> {
    let href = |l: &Element| {
        l.attr("href")
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
    };

    entry
        .children_named("link")
        .filter(|l| l.attr("rel").unwrap_or("alternate").trim() == "alternate")
        .find_map(href)
        .or_else(|| entry.child("link").and_then(href))
}

fn non_empty_deep_text(el: Option<&Element>) -> Option<String> {
    el.map(Element::deep_text).filter(|t| !t.is_empty())
}

fn entry_fields(entry: &Element) -> RawEntry {
    RawEntry {
        title: entry.child_text("title"),
        link: pick_link(entry),
        source_id: entry.child_text("id"),
        published: entry
            .child_text("published")
            .or_else(|| entry.child_text("updated")),
        description: non_empty_deep_text(entry.child("summary"))
            .or_else(|| non_empty_deep_text(entry.child("content"))),
    }
}

/// Extract items from an Atom `<feed>` root. Entries without title or link
/// are skipped.
pub fn extract(feed: &Element, source: &str, now: DateTime<Utc>) -> Vec<Item> {
    feed.children_named("entry")
        .filter_map(|entry| entry_fields(entry).into_item(source, now))
        .collect()
}

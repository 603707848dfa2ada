// src/ingest/formats/rss.rs
use chrono::{DateTime, Utc};

use crate::ingest::types::{Item, RawEntry};
use crate::ingest::xml::Element;

/// `<link>` text, or the href of a link-like child (`atom:link` inside items).
fn pick_link(item: &Element) -> Option<String> {
    item.child_text("link").or_else(|| {
        item.children_named("link")
            .filter_map(|l| l.attr("href"))
            .map(str::trim)
            .find(|h| !h.is_empty())
            .map(str::to_string)
    })
}

fn item_fields(item: &Element) -> RawEntry {
    RawEntry {
        title: item.child_text("title"),
        link: pick_link(item),
        source_id: item.child_text("guid"),
        // dc:date covers RSS 1.0 feeds
        published: item
            .child_text("pubDate")
            .or_else(|| item.child_text("date")),
        // content:encoded
        description: item
            .child_text("description")
            .or_else(|| item.child_text("encoded")),
    }
}

/// Extract items from an RSS 2.0 or RSS 1.0 (RDF) document.
///
/// Items are searched for anywhere inside the first `channel`. RDF feeds keep
/// their items as siblings of `channel`, so when the channel holds none, direct
/// children of the root are used instead. A document with no `channel` yields
/// nothing.
pub fn extract(root: &Element, source: &str, now: DateTime<Utc>) -> Vec<Item> {
    let channel = if root.is("channel") {
        Some(root)
    } else {
        root.find("channel")
    };
    let Some(channel) = channel else {
        return Vec::new();
    };

    let mut found = channel.find_all("item");
    if found.is_empty() {
        found = root.children_named("item").collect();
    }

    found
        .into_iter()
        .filter_map(|it| item_fields(it).into_item(source, now))
        .collect()
}

// src/render.rs
//! RSS 2.0 output.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::counter;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

use crate::dates::format_canonical;
use crate::ingest::config::FeedConfig;
use crate::ingest::types::Item;
use crate::sanitize::{clean, guess_image_mime};

pub const AGGREGATOR_DESCRIPTION: &str = "Aggregated feed generated by feed-merger";
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const RSS_MEDIA_TYPE: &str = "application/rss+xml";

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    w.create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// `"[source] excerpt"`, or the bare excerpt when there is no label.
pub fn item_description(source: &str, excerpt: &str) -> String {
    let source = source.trim();
    if source.is_empty() {
        excerpt.to_string()
    } else {
        format!("[{source}] {excerpt}")
    }
}

fn write_item<W: Write>(w: &mut Writer<W>, item: &Item) -> Result<()> {
    let cleaned = clean(&item.description_raw);

    w.write_event(Event::Start(BytesStart::new("item")))?;
    text_element(w, "title", &item.title)?;
    text_element(w, "link", &item.link)?;
    // guid is always the link; readers need a dereferenceable identifier
    text_element(w, "guid", &item.link)?;
    text_element(w, "pubDate", &item.published)?;
    text_element(w, "description", &item_description(&item.source, &cleaned.excerpt))?;
    if let Some(img) = cleaned.image_url.as_deref() {
        w.create_element("enclosure")
            .with_attribute(("url", img))
            .with_attribute(("length", "0"))
            .with_attribute(("type", guess_image_mime(img)))
            .write_empty()?;
    }
    w.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

/// Serialize the final items into a UTF-8 RSS 2.0 document.
///
/// `now` becomes `lastBuildDate`; pass the same instant the pipeline used.
pub fn render_feed(cfg: &FeedConfig, items: &[Item], now: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    w.write_event(Event::Start(rss))?;
    w.write_event(Event::Start(BytesStart::new("channel")))?;

    text_element(&mut w, "title", &cfg.title)?;
    text_element(&mut w, "link", &cfg.site_url)?;
    text_element(&mut w, "description", AGGREGATOR_DESCRIPTION)?;
    text_element(&mut w, "language", "en")?;
    text_element(&mut w, "lastBuildDate", &format_canonical(&now))?;
    if let Some(feed_url) = cfg.feed_url.as_deref().filter(|u| !u.trim().is_empty()) {
        w.create_element("atom:link")
            .with_attribute(("href", feed_url))
            .with_attribute(("rel", "self"))
            .with_attribute(("type", RSS_MEDIA_TYPE))
            .write_empty()?;
    }

    for item in items {
        write_item(&mut w, item)?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))?;
    w.write_event(Event::End(BytesEnd::new("rss")))?;

    counter!("feed_items_rendered_total").increment(items.len() as u64);
    Ok(w.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RawEntry;
    use crate::ingest::xml::parse_document;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn cfg(feed_url: Option<&str>) -> FeedConfig {
        FeedConfig {
            title: "Merged & Co".into(),
            site_url: "https://site.example".into(),
            feed_url: feed_url.map(str::to_string),
            max_items_total: 120,
            sources: vec![],
        }
    }

    fn item(desc: &str, source: &str) -> Item {
        RawEntry {
            title: Some("Fish & <Chips>".into()),
            link: Some("http://x/1".into()),
            source_id: Some("urn:other".into()),
            published: Some("2024-10-03T08:00:00Z".into()),
            description: Some(desc.into()),
        }
        .into_item(source, now())
        .unwrap()
    }

    #[test]
    fn description_prefix() {
        assert_eq!(item_description("Wire", "text"), "[Wire] text");
        assert_eq!(item_description("", "text"), "text");
    }

    #[test]
    fn renders_channel_and_items() {
        let bytes = render_feed(
            &cfg(Some("https://site.example/feed.xml")),
            &[item(r#"<p>Body <img src="https://cdn/x.png"></p>"#, "Wire")],
            now(),
        )
        .unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

        let root = parse_document(&bytes).unwrap();
        assert_eq!(root.name, "rss");
        assert_eq!(root.attr("version"), Some("2.0"));
        let ch = root.child("channel").unwrap();
        assert_eq!(ch.child_text("title").as_deref(), Some("Merged & Co"));
        assert_eq!(ch.child_text("link").as_deref(), Some("https://site.example"));
        assert_eq!(ch.child_text("description").as_deref(), Some(AGGREGATOR_DESCRIPTION));
        assert_eq!(ch.child_text("language").as_deref(), Some("en"));
        assert_eq!(
            ch.child_text("lastBuildDate").as_deref(),
            Some("Wed, 01 Jan 2025 00:00:00 +0000")
        );
        let self_link = ch.children_named("link").find(|l| l.name == "atom:link").unwrap();
        assert_eq!(self_link.attr("rel"), Some("self"));
        assert_eq!(self_link.attr("type"), Some(RSS_MEDIA_TYPE));
        assert_eq!(self_link.attr("href"), Some("https://site.example/feed.xml"));

        let it = ch.child("item").unwrap();
        assert_eq!(it.child_text("title").as_deref(), Some("Fish & <Chips>"));
        assert_eq!(it.child_text("guid").as_deref(), Some("http://x/1"));
        assert_eq!(
            it.child_text("pubDate").as_deref(),
            Some("Thu, 03 Oct 2024 08:00:00 +0000")
        );
        assert_eq!(it.child_text("description").as_deref(), Some("[Wire] Body"));
        let enc = it.child("enclosure").unwrap();
        assert_eq!(enc.attr("url"), Some("https://cdn/x.png"));
        assert_eq!(enc.attr("type"), Some("image/png"));
    }

    #[test]
    fn no_self_link_or_enclosure_when_absent() {
        let bytes = render_feed(&cfg(None), &[item("plain", "")], now()).unwrap();
        let root = parse_document(&bytes).unwrap();
        let ch = root.child("channel").unwrap();
        assert!(ch.children_named("link").all(|l| l.name != "atom:link"));
        let it = ch.child("item").unwrap();
        assert!(it.child("enclosure").is_none());
        assert_eq!(it.child_text("description").as_deref(), Some("plain"));
    }
}

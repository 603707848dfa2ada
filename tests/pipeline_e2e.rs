// tests/pipeline_e2e.rs
use chrono::{DateTime, TimeZone, Utc};
use feed_merger::ingest::transport::StaticTransport;
use feed_merger::ingest::xml::{parse_document, Element};
use feed_merger::{build_feed, FeedConfig, SourceConfig};

const ATOM_XML: &str = include_str!("fixtures/atom_single.xml");
const RSS_DUP_XML: &str = include_str!("fixtures/rss_duplicate.xml");
const RSS_DATES_XML: &str = include_str!("fixtures/rss_dates.xml");
const PREFIXED_XML: &str = include_str!("fixtures/rss_prefixed.xml");

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn config(max: usize, sources: &[(&str, &str)]) -> FeedConfig {
    FeedConfig {
        title: "Merged".into(),
        site_url: "https://merged.test".into(),
        feed_url: Some("https://merged.test/feed.xml".into()),
        max_items_total: max,
        sources: sources
            .iter()
            .map(|(name, url)| SourceConfig {
                name: name.to_string(),
                url: url.to_string(),
            })
            .collect(),
    }
}

fn rendered_items(bytes: &[u8]) -> Vec<Element> {
    let root = parse_document(bytes).expect("rendered feed is well-formed");
    root.child("channel")
        .expect("channel")
        .children_named("item")
        .cloned()
        .collect()
}

#[tokio::test]
async fn same_link_across_sources_is_rendered_once() {
    let transport = StaticTransport::new()
        .with("http://atom.test/feed", ATOM_XML)
        .with("http://rss.test/feed", RSS_DUP_XML);
    let cfg = config(
        10,
        &[("Atom", "http://atom.test/feed"), ("Rss", "http://rss.test/feed")],
    );

    let (bytes, report) = build_feed(&cfg, &transport, now()).await.expect("render");
    assert_eq!(report.deduplicated, 1);
    assert_eq!(report.ok_sources, 2);

    let items = rendered_items(&bytes);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].child_text("link").as_deref(), Some("http://x/1"));
    assert_eq!(items[0].child_text("guid").as_deref(), Some("http://x/1"));
    // first occurrence (the Atom source) wins
    assert_eq!(items[0].child_text("title").as_deref(), Some("A"));
    assert_eq!(
        items[0].child_text("description").as_deref(),
        Some("[Atom] Atom body")
    );
}

#[tokio::test]
async fn undated_items_sort_as_now_ahead_of_dated_ones() {
    let transport = StaticTransport::new().with("http://dates.test/feed", RSS_DATES_XML);
    let cfg = config(10, &[("Dates", "http://dates.test/feed")]);

    let (bytes, _) = build_feed(&cfg, &transport, now()).await.expect("render");
    let items = rendered_items(&bytes);
    let links: Vec<String> = items
        .iter()
        .filter_map(|i| i.child_text("link"))
        .collect();
    assert_eq!(
        links,
        vec![
            "http://dates.test/x",
            "http://dates.test/3",
            "http://dates.test/2"
        ]
    );
    assert_eq!(
        items[0].child_text("pubDate").as_deref(),
        Some("Wed, 01 Jan 2025 00:00:00 +0000")
    );
    assert_eq!(
        items[1].child_text("pubDate").as_deref(),
        Some("Thu, 03 Oct 2024 08:00:00 +0000")
    );
    assert_eq!(
        items[2].child_text("pubDate").as_deref(),
        Some("Wed, 02 Oct 2024 10:00:00 GMT")
    );
}

#[tokio::test]
async fn invalid_source_does_not_abort_the_run() {
    let transport = StaticTransport::new()
        .with("http://broken.test/feed", "<rss><channel><item><title>cut off")
        .with("http://prefixed.test/feed", PREFIXED_XML);
    let cfg = config(
        10,
        &[
            ("Broken", "http://broken.test/feed"),
            ("Offline", "http://offline.test/feed"),
            ("Prefixed", "http://prefixed.test/feed"),
        ],
    );

    let (bytes, report) = build_feed(&cfg, &transport, now()).await.expect("render");
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.ok_sources, 1);

    let items = rendered_items(&bytes);
    assert_eq!(items.len(), 2);
    let first = &items[0];
    assert_eq!(first.child_text("title").as_deref(), Some("Prefixed two"));
    assert_eq!(
        first.child_text("description").as_deref(),
        Some("[Prefixed] Fish & chips bold")
    );
    let second = &items[1];
    assert_eq!(second.child_text("description").as_deref(), Some("[Prefixed] Lead para"));
    let enc = second.child("enclosure").expect("enclosure");
    assert_eq!(enc.attr("url"), Some("https://cdn.test/lead.webp"));
    assert_eq!(enc.attr("type"), Some("image/webp"));
}

#[tokio::test]
async fn output_is_deterministic_for_a_frozen_clock() {
    let transport = StaticTransport::new()
        .with("a", ATOM_XML)
        .with("b", RSS_DATES_XML)
        .with("c", PREFIXED_XML);
    let cfg = config(3, &[("A", "a"), ("B", "b"), ("C", "c")]);

    let (first, r1) = build_feed(&cfg, &transport, now()).await.expect("render");
    let (second, _) = build_feed(&cfg, &transport, now()).await.expect("render");
    assert_eq!(first, second);
    assert_eq!(r1.items.len(), 3);
    assert_eq!(rendered_items(&first).len(), 3);
}

// src/ingest/formats/mod.rs
//! Feed-format dispatch: Atom when the root's local name is `feed`, RSS
//! (2.0 or RDF) otherwise.

pub mod atom;
pub mod rss;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};

use crate::error::FeedError;
use crate::ingest::types::Item;
use crate::ingest::xml::parse_document;

/// Parse raw feed bytes into normalized items labelled with `source`.
///
/// `now` is the run's frozen clock, used for entries whose date is missing or
/// unparseable. Fails only when the bytes are not well-formed XML.
pub fn parse_feed(bytes: &[u8], source: &str, now: DateTime<Utc>) -> Result<Vec<Item>, FeedError> {
    let t0 = std::time::Instant::now();
    let root = parse_document(bytes)?;

    let items = if root.is("feed") {
        atom::extract(&root, source, now)
    } else {
        rss::extract(&root, source, now)
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_items_parsed_total").increment(items.len() as u64);
    tracing::debug!(source, root = root.name.as_str(), items = items.len(), "parsed feed");

    Ok(items)
}

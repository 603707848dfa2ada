// src/lib.rs
//! Merge independently-operated RSS/Atom feeds into one RSS 2.0 document.
//!
//! Flow: [`ingest::run_once`] fetches each source through a
//! [`FeedTransport`], parses it ([`ingest::formats::parse_feed`]), then
//! deduplicates, sorts newest-first and truncates. [`render_feed`] writes
//! the result.

pub mod dates;
pub mod error;
pub mod ingest;
pub mod render;
pub mod sanitize;

// ---- Re-exports for stable public API ----
pub use crate::error::FeedError;
pub use crate::ingest::config::{FeedConfig, SourceConfig};
pub use crate::ingest::types::{FeedTransport, Item};
pub use crate::ingest::{run_once, RunReport};
pub use crate::render::render_feed;

use chrono::{DateTime, Utc};

/// Run the pipeline and render the merged feed in one call.
pub async fn build_feed<T>(
    cfg: &FeedConfig,
    transport: &T,
    now: DateTime<Utc>,
) -> anyhow::Result<(Vec<u8>, RunReport)>
where
    T: FeedTransport + ?Sized,
{
    let report = run_once(cfg, transport, now).await;
    let bytes = render_feed(cfg, &report.items, now)?;
    Ok((bytes, report))
}

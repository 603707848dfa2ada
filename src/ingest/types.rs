// src/ingest/types.rs
use chrono::{DateTime, Utc};

use crate::dates::normalize_published;
use crate::error::FeedError;

/// One normalized news entry. Never mutated after construction; the pipeline
/// only filters and reorders these.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub link: String,
    /// Always equal to `link` so rendered identifiers are dereferenceable.
    pub guid: String,
    /// The producer's own `id`/`guid` text, kept for debugging only.
    pub source_id: Option<String>,
    /// Date string exactly as found in the feed (may be empty).
    pub raw_published: String,
    /// Canonical wire-format date (RFC 2822, UTC).
    pub published: String,
    pub published_at: DateTime<Utc>, // sort key
    pub description_raw: String,
    pub source: String, // feed label, e.g. "Post-Courier"
}

/// Fields pulled out of one `<entry>` / `<item>` before validation.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub source_id: Option<String>,
    pub published: Option<String>,
    pub description: Option<String>,
}

impl RawEntry {
    /// Build an [`Item`], or `None` when title or link is missing.
    pub fn into_item(self, source: &str, now: DateTime<Utc>) -> Option<Item> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let link = self.link.filter(|l| !l.trim().is_empty())?;
        let raw_published = self.published.unwrap_or_default();
        let (published, published_at) = normalize_published(&raw_published, now);

        Some(Item {
            title: title.trim().to_string(),
            guid: link.trim().to_string(),
            link: link.trim().to_string(),
            source_id: self.source_id.filter(|s| !s.is_empty()),
            raw_published,
            published,
            published_at,
            description_raw: self.description.unwrap_or_default(),
            source: source.to_string(),
        })
    }
}

/// Retrieves raw feed bytes for a URL. Timeouts, retries, and TLS live behind
/// this seam.
#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError>;
}

// src/ingest/mod.rs
pub mod config;
pub mod dedup;
pub mod formats;
pub mod transport;
pub mod types;
pub mod xml;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::error::FeedError;
use crate::ingest::config::{FeedConfig, SourceConfig};
use crate::ingest::types::{FeedTransport, Item};

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_parsed_total", "Items extracted from source feeds.");
        describe_counter!(
            "feed_items_dedup_total",
            "Items removed as duplicates of an earlier item."
        );
        describe_counter!(
            "feed_source_errors_total",
            "Sources skipped due to transport or parse errors."
        );
        describe_counter!("feed_items_rendered_total", "Items written to the merged feed.");
        describe_histogram!("feed_parse_ms", "Per-source parse time in milliseconds.");
        describe_gauge!("feed_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// A source that was skipped for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWarning {
    pub source: String,
    pub url: String,
    pub error: FeedError,
}

/// Everything gathered from the sources, before dedup/sort.
#[derive(Debug, Default)]
pub struct Collected {
    pub items: Vec<Item>,
    /// Sources that produced at least one item.
    pub ok_sources: usize,
    pub warnings: Vec<SourceWarning>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Final ordered, size-bounded items.
    pub items: Vec<Item>,
    pub ok_sources: usize,
    pub warnings: Vec<SourceWarning>,
    /// Items dropped by deduplication.
    pub deduplicated: usize,
}

async fn fetch_and_parse<T>(
    transport: &T,
    src: &SourceConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Item>, FeedError>
where
    T: FeedTransport + ?Sized,
{
    let bytes = transport.fetch(&src.url).await?;
    formats::parse_feed(&bytes, &src.name, now)
}

/// Fetch and parse every source in configuration order. A failing source is
/// logged and skipped; it never aborts the run.
pub async fn collect_sources<T>(
    sources: &[SourceConfig],
    transport: &T,
    now: DateTime<Utc>,
) -> Collected
where
    T: FeedTransport + ?Sized,
{
    let mut acc = Collected::default();
    for src in sources {
        match fetch_and_parse(transport, src, now).await {
            Ok(mut items) => {
                tracing::debug!(source = %src.name, items = items.len(), "source ok");
                if !items.is_empty() {
                    acc.ok_sources += 1;
                }
                acc.items.append(&mut items);
            }
            Err(e) => {
                tracing::warn!(source = %src.name, url = %src.url, error = %e, "source failed");
                counter!("feed_source_errors_total").increment(1);
                acc.warnings.push(SourceWarning {
                    source: src.name.clone(),
                    url: src.url.clone(),
                    error: e,
                });
            }
        }
    }
    acc
}

/// Newest first (stable, so ties keep collection order), then truncate.
pub fn order_and_truncate(mut items: Vec<Item>, max_items: usize) -> Vec<Item> {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    items.truncate(max_items);
    items
}

/// Run the whole pipeline once: collect, deduplicate, order, truncate.
///
/// `now` is captured once by the caller and threaded through so output is
/// deterministic for identical input bytes.
pub async fn run_once<T>(cfg: &FeedConfig, transport: &T, now: DateTime<Utc>) -> RunReport
where
    T: FeedTransport + ?Sized,
{
    ensure_metrics_described();

    let Collected {
        items,
        ok_sources,
        warnings,
    } = collect_sources(&cfg.sources, transport, now).await;

    let collected = items.len();
    let uniq = dedup::dedupe(items);
    let deduplicated = collected - uniq.len();
    let items = order_and_truncate(uniq, cfg.max_items_total);

    // Telemetry
    counter!("feed_items_dedup_total").increment(deduplicated as u64);
    gauge!("feed_last_run_ts").set(now.timestamp() as f64);

    tracing::info!(
        target: "ingest",
        kept = items.len(),
        deduplicated,
        ok_sources,
        failed_sources = warnings.len(),
        "pipeline run finished"
    );

    RunReport {
        items,
        ok_sources,
        warnings,
        deduplicated,
    }
}

//! feed-merger — binary entrypoint.
//! Loads the source list, runs the pipeline once, writes the merged RSS file.

use anyhow::Context;
use chrono::Utc;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feed_merger::ingest::config::load_config_default;
use feed_merger::ingest::transport::HttpTransport;

const ENV_OUTPUT_PATH: &str = "FEED_MERGER_OUTPUT_PATH";
const DEFAULT_OUTPUT_PATH: &str = "feeds/latest.xml";
/// The run summary is logged under the `ingest` target.
const DEFAULT_LOG_FILTER: &str = "feed_merger=info,ingest=info,warn";

/// Compact logs by default; JSON lines when FEED_MERGER_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("FEED_MERGER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = load_config_default().context("loading feed config")?;
    let transport = HttpTransport::new()?;

    // One clock reading per run: date fallbacks and lastBuildDate share it.
    let now = Utc::now();
    let (bytes, report) = feed_merger::build_feed(&cfg, &transport, now).await?;

    let out = std::env::var(ENV_OUTPUT_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_PATH));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("writing {}", out.display()))?;

    println!(
        "Generated {} with {} items from {}/{} sources",
        out.display(),
        report.items.len(),
        report.ok_sources,
        cfg.sources.len()
    );
    Ok(())
}

// src/ingest/transport.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::FeedError;
use crate::ingest::types::FeedTransport;

pub const USER_AGENT: &str = concat!("feed-merger/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP(S) transport with an identifying User-Agent and a per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

/// Anything outside 2xx is a transport failure, redirects included (reqwest
/// has already followed those).
fn check_status(status: reqwest::StatusCode) -> Result<(), FeedError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FeedError::TransportFailure(format!("HTTP status {status}")))
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let resp = self.client.get(url).send().await?;
        check_status(resp.status())?;
        let body = resp.bytes().await?;
        Ok(body.to_vec())
    }
}

/// Serves canned bodies by URL. Unknown URLs fail like an unreachable host.
#[derive(Debug, Default, Clone)]
pub struct StaticTransport {
    pages: HashMap<String, Vec<u8>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&mut self, url: &str, body: impl Into<Vec<u8>>) {
        self.pages.insert(url.to_string(), body.into());
    }
}

#[async_trait]
impl FeedTransport for StaticTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FeedError::TransportFailure(format!("no route to {url}")))
    }
}

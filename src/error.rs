// src/error.rs
use thiserror::Error;

/// Per-source failures. Both are non-fatal at the run level: the pipeline logs
/// them and moves on to the next source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Input bytes are not well-formed XML.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    /// Network, TLS, timeout, or non-2xx HTTP status.
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl From<quick_xml::Error> for FeedError {
    fn from(e: quick_xml::Error) -> Self {
        FeedError::MalformedDocument(e.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::TransportFailure(e.to_string())
    }
}

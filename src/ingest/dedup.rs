// src/ingest/dedup.rs
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::ingest::types::Item;

/// Hex SHA-256 over `guid \n link \n`.
pub fn identity_key(guid: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [guid, link] {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Keep the first occurrence of each identity key, preserving order.
pub fn dedupe(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    for it in items {
        if seen.insert(identity_key(&it.guid, &it.link)) {
            keep.push(it);
        } else {
            tracing::trace!(link = %it.link, source = %it.source, "duplicate dropped");
        }
    }
    keep
}

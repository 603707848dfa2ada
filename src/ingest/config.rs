// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_PATH: &str = "FEED_MERGER_CONFIG_PATH";
pub const DEFAULT_MAX_ITEMS_TOTAL: usize = 120;
const DEFAULT_SOURCE_NAME: &str = "Source";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub site_url: String,
    /// Enables the `atom:link rel="self"` element when set.
    #[serde(default)]
    pub feed_url: Option<String>,
    #[serde(default = "default_max_items_total")]
    pub max_items_total: usize,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_max_items_total() -> usize {
    DEFAULT_MAX_ITEMS_TOTAL
}

/// Load configuration from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<FeedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing feed config {}", path.display()))
}

/// Load configuration using env var + fallbacks:
/// 1) $FEED_MERGER_CONFIG_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
pub fn load_config_default() -> Result<FeedConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Err(anyhow!(
        "no feed config found (set {ENV_PATH} or add config/sources.toml)"
    ))
}

pub fn parse_config(s: &str, hint_ext: &str) -> Result<FeedConfig> {
    // JSON documents always open with '{'; anything else is treated as TOML first.
    let try_toml = hint_ext == "toml" || (hint_ext != "json" && !s.trim_start().starts_with('{'));
    if try_toml {
        if let Ok(v) = toml::from_str::<FeedConfig>(s) {
            return Ok(clean_config(v));
        }
    }
    match serde_json::from_str::<FeedConfig>(s) {
        Ok(v) => Ok(clean_config(v)),
        Err(json_err) => {
            if !try_toml {
                if let Ok(v) = toml::from_str::<FeedConfig>(s) {
                    return Ok(clean_config(v));
                }
            }
            Err(anyhow!("unsupported feed config format: {json_err}"))
        }
    }
}

/// Trim fields, name anonymous sources, drop sources without a URL.
fn clean_config(mut cfg: FeedConfig) -> FeedConfig {
    cfg.title = cfg.title.trim().to_string();
    cfg.site_url = cfg.site_url.trim().to_string();
    cfg.feed_url = cfg
        .feed_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    cfg.sources = cfg
        .sources
        .into_iter()
        .filter_map(|src| {
            let url = src.url.trim().to_string();
            let name = match src.name.trim() {
                "" => DEFAULT_SOURCE_NAME.to_string(),
                n => n.to_string(),
            };
            if url.is_empty() {
                tracing::warn!(source = %name, "source has no url; skipping");
                return None;
            }
            Some(SourceConfig { name, url })
        })
        .collect();
    cfg
}

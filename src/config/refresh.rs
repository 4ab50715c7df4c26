// src/config/refresh.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::Classifier;

pub const DEFAULT_REFRESH_CONFIG_PATH: &str = "config/refresh.toml";
pub const ENV_REFRESH_CONFIG_PATH: &str = "REFRESH_CONFIG_PATH";

/// What the feed is searched with for each competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStrategy {
    /// Display name, then bare domain, then id.
    #[default]
    Name,
    /// Internal id, verbatim.
    Id,
}

fn default_true() -> bool {
    true
}
fn default_summary_window() -> usize {
    5
}
fn default_max_items() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefreshSettings {
    #[serde(default = "default_true")]
    pub dedupe: bool,
    #[serde(default)]
    pub classifier: Classifier,
    #[serde(default)]
    pub query: QueryStrategy,
    #[serde(default = "default_summary_window")]
    pub summary_window: usize,
    #[serde(default = "default_max_items")]
    pub max_items_per_feed: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            dedupe: true,
            classifier: Classifier::default(),
            query: QueryStrategy::default(),
            summary_window: default_summary_window(),
            max_items_per_feed: default_max_items(),
        }
    }
}

impl RefreshSettings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: RefreshSettings = toml::from_str(s)?;
        if cfg.summary_window == 0 {
            cfg.summary_window = default_summary_window();
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading refresh config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// 1) $REFRESH_CONFIG_PATH (must exist)
    /// 2) config/refresh.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_REFRESH_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("REFRESH_CONFIG_PATH points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let pb = PathBuf::from(DEFAULT_REFRESH_CONFIG_PATH);
        if pb.exists() {
            return Self::load_from(&pb);
        }
        Ok(Self::default())
    }
}

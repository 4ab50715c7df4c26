// src/ingest/types.rs
use anyhow::Result;

/// One raw item from a news feed, before classification.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,              // normalized headline
    pub url: Option<String>,
    pub published_at: Option<String>, // RFC 3339 when the feed date parsed
    pub source: Option<String>,     // publisher, e.g. "Reuters"
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &'static str;
}

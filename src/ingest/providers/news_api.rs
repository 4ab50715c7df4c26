// src/ingest/providers/news_api.rs
//! Client for the hosted news search endpoint (`/v2/everything`).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::model::NewsArticle;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

#[derive(Debug, Deserialize)]
struct Resp {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<RawArticle> for NewsArticle {
    fn from(a: RawArticle) -> Self {
        NewsArticle {
            title: a.title.unwrap_or_default(),
            url: a.url.unwrap_or_default(),
            source: a.source.and_then(|s| s.name).unwrap_or_default(),
            published_at: a.published_at.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
        }
    }
}

pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("intemint/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building news api http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Free-text search, newest first, English only.
    pub async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>> {
        let Some(key) = self.api_key.as_deref() else {
            bail!("News API key not found");
        };
        let page_size = page_size.to_string();
        let resp = self
            .http
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", query),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", key),
            ])
            .send()
            .await
            .context("news api get()")?;

        let body: Resp = resp.json().await.context("news api json")?;
        parse_response(body)
    }

    /// Top 3 articles for a competitor, scoped by its industry.
    pub async fn competitor_news(&self, name: &str, industry: &str) -> Result<Vec<NewsArticle>> {
        let query = format!("{name} {industry}");
        self.search(query.trim(), 3).await
    }

    /// Latest 5 articles for an industry keyword.
    pub async fn industry_news(&self, industry: &str) -> Result<Vec<NewsArticle>> {
        self.search(industry, 5).await
    }
}

fn parse_response(body: Resp) -> Result<Vec<NewsArticle>> {
    if body.status != "ok" {
        bail!(
            "News API returned an error: {}",
            body.message.unwrap_or_else(|| body.status.clone())
        );
    }
    Ok(body.articles.into_iter().map(NewsArticle::from).collect())
}

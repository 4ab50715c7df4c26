// src/ingest/providers/google_news.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime, UtcOffset,
};

use crate::ingest::normalize_text;
use crate::ingest::types::{FeedItem, FeedProvider};

pub const DEFAULT_BASE_URL: &str = "https://news.google.com";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "$text")]
    name: Option<String>,
}

/// RFC 2822 feed date to RFC 3339. Unparseable dates are dropped.
fn rfc2822_to_rfc3339(ts: &str) -> Option<String> {
    let ts = ts.trim();
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc2822) {
        return dt.to_offset(UtcOffset::UTC).format(&Rfc3339).ok();
    }
    // Some publishers emit zone names `time` rejects; chrono is more lenient.
    chrono::DateTime::parse_from_rfc2822(ts)
        .ok()
        .map(|dt| {
            dt.with_timezone(&chrono::Utc)
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        })
}

/// Google News RSS search. One request per query.
pub struct GoogleNewsRss {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { base_url: String, client: reqwest::Client },
}

impl GoogleNewsRss {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("intemint/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: base_url.trim_end_matches('/').to_string(),
                client,
            },
        })
    }

    pub fn parse_items_from_str(s: &str) -> Result<Vec<FeedItem>> {
        let t0 = std::time::Instant::now();
        let rss: Rss = from_str(s).context("parsing google news rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let source = it
                .source
                .and_then(|s| s.name)
                .map(|n| normalize_text(&n))
                .filter(|n| !n.is_empty());

            out.push(FeedItem {
                title,
                url: it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
                published_at: it.pub_date.as_deref().and_then(rfc2822_to_rfc3339),
                source,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        counter!("feed_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for GoogleNewsRss {
    async fn fetch(&self, query: &str) -> Result<Vec<FeedItem>> {
        crate::ingest::ensure_metrics_described();
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http { base_url, client } => {
                let url = format!("{base_url}/rss/search");
                let resp = client
                    .get(&url)
                    .query(&[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")])
                    .send()
                    .await;
                let body = match resp {
                    Ok(r) => r
                        .error_for_status()
                        .context("google news non-2xx")?
                        .text()
                        .await
                        .context("google news .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "google-news", query, "feed http error");
                        counter!("feed_errors_total").increment(1);
                        return Err(e).context("google news get()");
                    }
                };
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "google-news"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_feed_dates() {
        assert_eq!(
            rfc2822_to_rfc3339("Mon, 15 Jan 2024 10:00:00 +0000").as_deref(),
            Some("2024-01-15T10:00:00Z")
        );
        assert_eq!(
            rfc2822_to_rfc3339("Mon, 15 Jan 2024 10:00:00 GMT").as_deref(),
            Some("2024-01-15T10:00:00Z")
        );
        assert!(rfc2822_to_rfc3339("not a date").is_none());
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let xml = r#"<rss version="2.0"><channel><title>none</title></channel></rss>"#;
        let items = GoogleNewsRss::parse_items_from_str(xml).unwrap();
        assert!(items.is_empty());
    }
}

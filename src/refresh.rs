//! Competitor news refresh.
//!
//! One sequential pass over every competitor row: re-read the row, search the
//! feed, append classified events, recompute the benchmark score, summarize
//! the tail of the log and write back the derived columns only. A failing
//! competitor is logged and counted; the pass moves on to the next one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyze::{benchmark_score, build_summarizer, DynSummarizer};
use crate::config::{AiConfig, AppConfig, QueryStrategy, RefreshSettings};
use crate::ingest::dedupe_batch;
use crate::ingest::providers::google_news::GoogleNewsRss;
use crate::ingest::types::FeedProvider;
use crate::model::{Competitor, DerivedColumns, Event};
use crate::store::CompetitorStore;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("refresh_runs_total", "Completed refresh passes.");
        describe_counter!("refresh_competitors_total", "Competitors refreshed successfully.");
        describe_counter!("refresh_failures_total", "Competitors whose refresh failed.");
        describe_counter!("refresh_events_appended_total", "Events appended to logs.");
        describe_counter!(
            "refresh_duplicates_skipped_total",
            "Feed items skipped because they were already logged."
        );
        describe_counter!("refresh_summary_errors_total", "Summarizer failures.");
        describe_histogram!("refresh_run_ms", "Duration of one refresh pass in milliseconds.");
    });
}

/// Search term for a competitor's feed.
pub fn feed_query(c: &Competitor, strategy: QueryStrategy) -> String {
    match strategy {
        QueryStrategy::Id => c.id.clone(),
        QueryStrategy::Name => {
            let name = c.name.trim();
            if !name.is_empty() {
                return name.to_string();
            }
            c.domain().unwrap_or_else(|| c.id.clone())
        }
    }
}

/// Outcome of refreshing one competitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorRefresh {
    pub id: String,
    pub fetched: usize,
    pub appended: usize,
    pub skipped: usize,
    pub benchmark_score: f64,
    pub summarized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub processed: usize,
    pub updated: Vec<CompetitorRefresh>,
    pub failed: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct NewsRefresher {
    store: Arc<dyn CompetitorStore>,
    feed: Arc<dyn FeedProvider>,
    summarizer: Option<DynSummarizer>,
    settings: RefreshSettings,
}

impl NewsRefresher {
    pub fn new(
        store: Arc<dyn CompetitorStore>,
        feed: Arc<dyn FeedProvider>,
        summarizer: Option<DynSummarizer>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            store,
            feed,
            summarizer,
            settings,
        }
    }

    /// Wires the hosted feed, the summarizer from `config/ai.json` and the
    /// settings from `config/refresh.toml` (or `REFRESH_CONFIG_PATH`).
    pub fn from_config(store: Arc<dyn CompetitorStore>, app: &AppConfig) -> Result<Self> {
        let feed = GoogleNewsRss::from_url(&app.feed_base_url)?;
        let ai = AiConfig::load_default().context("loading config/ai.json")?;
        let summarizer = build_summarizer(&ai)?;
        let settings = RefreshSettings::load_default().context("loading refresh settings")?;
        info!(
            target: "refresh",
            store = store.name(),
            summarizer = summarizer.as_ref().map(|s| s.name()).unwrap_or("disabled"),
            dedupe = settings.dedupe,
            "news refresher configured"
        );
        Ok(Self::new(store, Arc::new(feed), summarizer, settings))
    }

    /// Refresh every competitor. Only the initial listing is fatal.
    pub async fn run_once(&self) -> Result<RefreshReport> {
        ensure_metrics_described();
        let t0 = Instant::now();

        let competitors = self
            .store
            .list_all()
            .await
            .with_context(|| format!("listing competitors from {}", self.store.name()))?;

        let mut report = RefreshReport {
            processed: competitors.len(),
            ..Default::default()
        };

        for c in competitors {
            match self.refresh_competitor(&c.id).await {
                Ok(done) => {
                    counter!("refresh_competitors_total").increment(1);
                    info!(
                        target: "refresh",
                        id = %done.id,
                        appended = done.appended,
                        skipped = done.skipped,
                        score = done.benchmark_score,
                        "updated competitor"
                    );
                    report.updated.push(done);
                }
                Err(e) => {
                    counter!("refresh_failures_total").increment(1);
                    warn!(target: "refresh", id = %c.id, error = %format!("{e:#}"), "refresh failed");
                    report.failed.push(RefreshFailure {
                        id: c.id,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        counter!("refresh_runs_total").increment(1);
        histogram!("refresh_run_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        info!(
            target: "refresh",
            processed = report.processed,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "refresh pass finished"
        );
        Ok(report)
    }

    /// Refresh one row. The row is read again here so edits and events
    /// written since the listing are not lost.
    pub async fn refresh_competitor(&self, id: &str) -> Result<CompetitorRefresh> {
        let c = self
            .store
            .get(id)
            .await
            .with_context(|| format!("reading competitor {id}"))?
            .with_context(|| format!("competitor {id} no longer exists"))?;

        let query = feed_query(&c, self.settings.query);
        let mut items = self
            .feed
            .fetch(&query)
            .await
            .with_context(|| format!("fetching {} feed for {query:?}", self.feed.name()))?;
        let fetched = items.len();

        let mut skipped = 0usize;
        if self.settings.dedupe {
            let (kept, dropped) = dedupe_batch(items);
            items = kept;
            skipped += dropped;
        }
        items.truncate(self.settings.max_items_per_feed);

        let fallback_date = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut events: Vec<Event> = c.events.clone().unwrap_or_default();
        let mut seen: HashSet<String> = if self.settings.dedupe {
            events.iter().map(Event::fingerprint).collect()
        } else {
            HashSet::new()
        };

        let mut appended = 0usize;
        for item in &items {
            let ev = self.settings.classifier.classify(item, &fallback_date);
            if self.settings.dedupe && !seen.insert(ev.fingerprint()) {
                skipped += 1;
                continue;
            }
            events.push(ev);
            appended += 1;
        }
        counter!("refresh_events_appended_total").increment(appended as u64);
        counter!("refresh_duplicates_skipped_total").increment(skipped as u64);

        let score = benchmark_score(&events);

        let mut last_summary = None;
        if let Some(summarizer) = &self.summarizer {
            if !events.is_empty() {
                let start = events.len().saturating_sub(self.settings.summary_window);
                match summarizer.summarize(&events[start..]).await {
                    Ok(text) => last_summary = Some(text),
                    Err(e) => {
                        counter!("refresh_summary_errors_total").increment(1);
                        warn!(
                            target: "refresh",
                            id = %c.id,
                            provider = summarizer.name(),
                            error = %e,
                            "summary failed; keeping previous"
                        );
                    }
                }
            }
        }

        let summarized = last_summary.is_some();
        self.store
            .write_derived(&DerivedColumns {
                id: c.id.clone(),
                events,
                benchmark_score: score,
                last_summary,
            })
            .await
            .with_context(|| format!("writing refresh results for {}", c.id))?;

        Ok(CompetitorRefresh {
            id: c.id,
            fetched,
            appended,
            skipped,
            benchmark_score: score,
            summarized,
        })
    }
}

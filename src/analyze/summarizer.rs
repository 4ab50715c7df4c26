//! LLM summaries of recent events: provider abstraction + daily limit.
//!
//! The text endpoint's answer is stored verbatim (trimmed); there is no
//! schema to validate against.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ai::AiConfig;
use crate::model::Event;

const SYSTEM_PROMPT: &str = "You are a strategic analyst.";
const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Prompt body for a slice of events.
pub fn build_prompt(events: &[Event]) -> String {
    let json = serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string());
    format!("Summarize these events in 3 sentences: {json}")
}

#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, events: &[Event]) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynSummarizer = Arc<dyn Summarizer>;

/// Factory: `None` when summaries are disabled.
///
/// * `AI_TEST_MODE=mock` returns a deterministic mock.
/// * `provider = "openai"` builds the chat-completions client behind a daily cap.
pub fn build_summarizer(cfg: &AiConfig) -> Result<Option<DynSummarizer>> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        let mock = MockSummarizer::new("Summary unavailable (mock).");
        return Ok(Some(Arc::new(DailyLimited::new(mock, cfg.daily_limit))));
    }

    if !cfg.enabled {
        return Ok(None);
    }

    match cfg.provider.as_str() {
        "openai" => {
            let provider = OpenAiSummarizer::new(&cfg.api_key, &cfg.model)?;
            Ok(Some(Arc::new(DailyLimited::new(provider, cfg.daily_limit))))
        }
        other => bail!("Unsupported summarizer provider: {other}"),
    }
}

// ------------------------------------------------------------
// OpenAI chat completions
// ------------------------------------------------------------

pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("intemint/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building openai http client")?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

fn first_content(body: Resp) -> String {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, events: &[Event]) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OpenAI api key is empty");
        }
        let prompt = build_prompt(events);
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let resp = self
            .http
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai post")?
            .error_for_status()
            .context("openai non-2xx")?;

        let body: Resp = resp.json().await.context("openai json")?;
        Ok(first_content(body))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Fixed answer; used by tests and `AI_TEST_MODE=mock`.
#[derive(Clone)]
pub struct MockSummarizer {
    pub fixed: String,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockSummarizer {
    pub fn new(fixed: &str) -> Self {
        Self {
            fixed: fixed.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of events passed on each call so far.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().expect("mock calls poisoned").clone()
    }
}

#[async_trait::async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, events: &[Event]) -> Result<String> {
        self.calls
            .lock()
            .expect("mock calls poisoned")
            .push(events.len());
        Ok(self.fixed.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Daily limit wrapper
// ------------------------------------------------------------

#[derive(Debug, Clone)]
struct DailyCounter {
    date: NaiveDate,
    count: u32,
}

impl DailyCounter {
    fn today() -> Self {
        Self {
            date: Utc::now().date_naive(),
            count: 0,
        }
    }
}

/// Caps successful upstream calls per UTC day. Over the cap, calls fail
/// without reaching the provider.
pub struct DailyLimited<S: Summarizer> {
    inner: S,
    max_per_day: u32,
    counter: Mutex<DailyCounter>,
}

impl<S: Summarizer> DailyLimited<S> {
    pub fn new(inner: S, max_per_day: u32) -> Self {
        Self {
            inner,
            max_per_day,
            counter: Mutex::new(DailyCounter::today()),
        }
    }

    pub fn used_today(&self) -> u32 {
        self.counter.lock().expect("poisoned counter").count
    }
}

#[async_trait::async_trait]
impl<S: Summarizer> Summarizer for DailyLimited<S> {
    async fn summarize(&self, events: &[Event]) -> Result<String> {
        {
            let mut g = self.counter.lock().expect("poisoned counter");
            let today = Utc::now().date_naive();
            if g.date != today {
                *g = DailyCounter::today();
            }
            if g.count >= self.max_per_day {
                return Err(anyhow!(
                    "daily summary limit reached ({}/{})",
                    g.count,
                    self.max_per_day
                ));
            }
        }

        let out = self.inner.summarize(events).await?;
        let mut g = self.counter.lock().expect("poisoned counter");
        g.count = g.count.saturating_add(1);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_events_as_json() {
        let ev = Event {
            date: "2024-01-15".into(),
            kind: "Investment".into(),
            outcome: "Success".into(),
            source: "RSS".into(),
            amount: None,
            title: None,
            url: None,
        };
        let p = build_prompt(&[ev]);
        assert!(p.starts_with("Summarize these events in 3 sentences: ["));
        assert!(p.contains(r#""type":"Investment""#));
    }

    #[test]
    fn response_content_is_trimmed_verbatim() {
        let body: Resp = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Acme raised money. It launched. It grew.\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(body), "Acme raised money. It launched. It grew.");

        let empty: Resp = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_content(empty), "");
    }

    #[tokio::test]
    async fn daily_limit_blocks_after_cap() {
        let limited = DailyLimited::new(MockSummarizer::new("ok"), 2);
        assert!(limited.summarize(&[]).await.is_ok());
        assert!(limited.summarize(&[]).await.is_ok());
        let err = limited.summarize(&[]).await.unwrap_err();
        assert!(err.to_string().contains("daily summary limit"));
        assert_eq!(limited.used_today(), 2);
    }
}

//! Feed item → event classification.
//!
//! `Fixed` tags every item `Investment`/`Success`, which is what the stored
//! logs were built with. `Keywords` is a small phrase table over the headline
//! (case-insensitive, first matching group wins):
//! - Investment: funding, raises, series, acquisition, ...
//! - Innovation: launch, unveil, patent, ...
//! - Partnership, Regulation
//! - anything else is `Neutral`
//!
//! Negative phrases (lawsuit, layoffs, breach, ...) set the outcome to
//! `Negative`; a matched group otherwise yields `Positive`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ingest::types::FeedItem;
use crate::model::{Event, EventKind, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classifier {
    #[default]
    Fixed,
    Keywords,
}

const INVESTMENT: &[&str] = &[
    "raises", "raised", "funding", "series a", "series b", "series c", "seed round",
    "pre-seed", "investment", "invests", "acquires", "acquisition", "valuation", "ipo",
];
const INNOVATION: &[&str] = &[
    "launch", "unveil", "introduces", "patent", "release", "new product", "rolls out",
    "debuts", "beta",
];
const PARTNERSHIP: &[&str] = &["partner", "teams up", "alliance", "collaborat"];
const REGULATION: &[&str] = &["regulat", "approval", "license", "compliance", "fined", "sec "];
const NEGATIVE: &[&str] = &[
    "lawsuit", "sued", "layoff", "lays off", "breach", "outage", "fails", "delay", "fined",
    "cuts", "shuts down", "probe",
];

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\s?(\d+(?:\.\d+)?)\s?(k|m|b|thousand|million|billion)\b").unwrap()
});

fn contains_any(hay: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| hay.contains(n))
}

/// Dollar figure in a headline, e.g. "$12.5M" → 12_500_000.
pub fn extract_amount(text: &str) -> Option<f64> {
    let caps = AMOUNT.captures(text)?;
    let base: f64 = caps.get(1)?.as_str().parse().ok()?;
    let mult = match caps.get(2)?.as_str().to_ascii_lowercase().as_str() {
        "k" | "thousand" => 1e3,
        "m" | "million" => 1e6,
        "b" | "billion" => 1e9,
        _ => 1.0,
    };
    Some(base * mult)
}

impl Classifier {
    pub fn classify(&self, item: &FeedItem, fallback_date: &str) -> Event {
        let (kind, outcome, amount) = match self {
            Classifier::Fixed => (EventKind::Investment, Outcome::Success, None),
            Classifier::Keywords => {
                let t = item.title.to_lowercase();
                let kind = if contains_any(&t, INVESTMENT) {
                    EventKind::Investment
                } else if contains_any(&t, INNOVATION) {
                    EventKind::Innovation
                } else if contains_any(&t, PARTNERSHIP) {
                    EventKind::Partnership
                } else if contains_any(&t, REGULATION) {
                    EventKind::Regulation
                } else {
                    EventKind::Neutral
                };
                let outcome = if contains_any(&t, NEGATIVE) {
                    Outcome::Negative
                } else if kind == EventKind::Neutral {
                    Outcome::Neutral
                } else {
                    Outcome::Positive
                };
                let amount = if kind == EventKind::Investment {
                    extract_amount(&item.title)
                } else {
                    None
                };
                (kind, outcome, amount)
            }
        };

        Event {
            date: item
                .published_at
                .clone()
                .unwrap_or_else(|| fallback_date.to_string()),
            kind,
            outcome,
            source: item.source.clone().unwrap_or_else(|| "RSS".to_string()),
            amount,
            title: Some(item.title.clone()),
            url: item.url.clone(),
        }
    }
}

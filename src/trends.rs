//! Market trend series and news keyword counts.

use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{NewsArticle, Trend, TrendPoint};

const WINDOW: usize = 7;

fn mean(v: &[TrendPoint]) -> f64 {
    v.iter().map(|p| p.value).sum::<f64>() / v.len() as f64
}

/// Trailing 7 points against the 7 before them: up above +10%, down below
/// -10%, neutral otherwise or when there is nothing to compare against.
pub fn classify_trend(points: &[TrendPoint]) -> Trend {
    if points.len() < 2 {
        return Trend::Neutral;
    }
    let split = points.len().saturating_sub(WINDOW);
    let recent = &points[split..];
    let previous = &points[split.saturating_sub(WINDOW)..split];
    if previous.is_empty() {
        return Trend::Neutral;
    }

    let (r, p) = (mean(recent), mean(previous));
    if r > p * 1.1 {
        Trend::Up
    } else if r < p * 0.9 {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

/// Percent change between the last two values; 0 when the earlier one is 0.
pub fn day_over_day_change(points: &[TrendPoint]) -> f64 {
    match points {
        [.., a, b] if a.value != 0.0 => (b.value - a.value) / a.value * 100.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    D7,
    #[default]
    #[serde(rename = "30d")]
    D30,
    #[serde(rename = "90d")]
    D90,
}

impl TimeRange {
    pub fn days(self) -> usize {
        match self {
            TimeRange::D7 => 7,
            TimeRange::D30 => 30,
            TimeRange::D90 => 90,
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" => Ok(TimeRange::D7),
            "30d" => Ok(TimeRange::D30),
            "90d" => Ok(TimeRange::D90),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

/// Last `range.days()` points of one keyword, in input order.
pub fn series(points: &[TrendPoint], keyword: &str, range: TimeRange) -> Vec<TrendPoint> {
    let all: Vec<&TrendPoint> = points.iter().filter(|p| p.keyword == keyword).collect();
    let skip = all.len().saturating_sub(range.days());
    all.into_iter().skip(skip).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordTrend {
    pub keyword: String,
    pub trend: Trend,
    pub change_pct: f64,
    pub points: Vec<TrendPoint>,
}

/// Series plus direction for each keyword over `range`.
pub fn keyword_trends(points: &[TrendPoint], keywords: &[String], range: TimeRange) -> Vec<KeywordTrend> {
    keywords
        .iter()
        .map(|kw| {
            let pts = series(points, kw, range);
            KeywordTrend {
                keyword: kw.clone(),
                trend: classify_trend(&pts),
                change_pct: day_over_day_change(&pts),
                points: pts,
            }
        })
        .collect()
}

/// Keywords tracked on the trends screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for it in items {
            set.add(it.as_ref());
        }
        set
    }

    /// Trimmed and lowercased; blanks and repeats are ignored.
    pub fn add(&mut self, kw: &str) -> bool {
        let kw = kw.trim().to_lowercase();
        if kw.is_empty() || self.0.contains(&kw) {
            return false;
        }
        self.0.push(kw);
        true
    }

    pub fn remove(&mut self, kw: &str) -> bool {
        let kw = kw.trim().to_lowercase();
        let before = self.0.len();
        self.0.retain(|k| *k != kw);
        self.0.len() != before
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "with", "by", "about",
    "as", "of", "from", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must", "this", "that", "these", "those", "it", "its", "they", "them", "their", "there",
    "here", "where", "when", "why", "how", "what", "which", "who", "whom", "whose",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Top 10 words over title + description. Ties keep first-seen order.
pub fn trending_keywords(articles: &[NewsArticle]) -> Vec<KeywordCount> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;

    for a in articles {
        let text = format!("{} {}", a.title, a.description).to_lowercase();
        for m in WORD.find_iter(&text) {
            let w = m.as_str();
            if w.chars().count() <= 2 || STOP_WORDS.contains(&w) {
                continue;
            }
            let e = counts.entry(w.to_string()).or_insert_with(|| {
                order += 1;
                (0, order)
            });
            e.0 += 1;
        }
    }

    let mut out: Vec<(String, usize, usize)> =
        counts.into_iter().map(|(k, (c, o))| (k, c, o)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    out.into_iter()
        .take(10)
        .map(|(keyword, count, _)| KeywordCount { keyword, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pts(values: &[f64]) -> Vec<TrendPoint> {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TrendPoint {
                date: d0 + chrono::Days::new(i as u64),
                value: *v,
                keyword: "fintech".into(),
            })
            .collect()
    }

    #[test]
    fn short_series_is_neutral() {
        assert_eq!(classify_trend(&pts(&[])), Trend::Neutral);
        assert_eq!(classify_trend(&pts(&[10.0])), Trend::Neutral);
        // Everything fits in the trailing window: nothing to compare against.
        assert_eq!(classify_trend(&pts(&[1.0, 100.0])), Trend::Neutral);
    }

    #[test]
    fn partial_previous_window_is_compared() {
        let mut v = vec![10.0; 2];
        v.extend([20.0; 7]);
        assert_eq!(classify_trend(&pts(&v)), Trend::Up);
    }

    #[test]
    fn day_over_day() {
        assert_eq!(day_over_day_change(&pts(&[50.0, 75.0])), 50.0);
        assert_eq!(day_over_day_change(&pts(&[0.0, 75.0])), 0.0);
        assert_eq!(day_over_day_change(&pts(&[5.0])), 0.0);
    }

    #[test]
    fn range_keeps_tail() {
        let p = pts(&(0..40).map(f64::from).collect::<Vec<_>>());
        let s = series(&p, "fintech", TimeRange::D7);
        assert_eq!(s.len(), 7);
        assert_eq!(s[0].value, 33.0);
        assert!(series(&p, "blockchain", TimeRange::D90).is_empty());
        assert_eq!("90D".parse::<TimeRange>().unwrap(), TimeRange::D90);
    }

    #[test]
    fn keyword_set_normalizes() {
        let mut k = KeywordSet::new(["Fintech", "fintech ", ""]);
        assert_eq!(k.as_slice(), ["fintech"]);
        assert!(k.add("Open Banking"));
        assert!(!k.add("open banking"));
        assert!(k.remove("FINTECH"));
        assert_eq!(k.as_slice(), ["open banking"]);
    }

    #[test]
    fn trending_counts_skip_stop_words_and_short_words() {
        let arts = vec![
            NewsArticle {
                title: "The payments boom".into(),
                url: "u1".into(),
                source: "s".into(),
                published_at: "2024-01-01T00:00:00Z".into(),
                description: "AI is in payments".into(),
            },
            NewsArticle {
                title: "Boom for neobank payments".into(),
                url: "u2".into(),
                source: "s".into(),
                published_at: "2024-01-02T00:00:00Z".into(),
                description: String::new(),
            },
        ];
        let top = trending_keywords(&arts);
        assert_eq!(top[0], KeywordCount { keyword: "payments".into(), count: 3 });
        assert_eq!(top[1], KeywordCount { keyword: "boom".into(), count: 2 });
        assert_eq!(top[2].keyword, "neobank");
        assert!(top.iter().all(|k| k.keyword != "the" && k.keyword != "ai"));
    }
}

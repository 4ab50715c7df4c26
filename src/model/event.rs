//! Events embedded in a competitor row (`competitors.events` JSON column).
//!
//! `type` and `outcome` are open sets: known labels map to variants, anything
//! else is preserved verbatim in `Other` so rows written by older tooling
//! round-trip untouched.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Investment,
    Innovation,
    Partnership,
    Regulation,
    Neutral,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Investment => "Investment",
            EventKind::Innovation => "Innovation",
            EventKind::Partnership => "Partnership",
            EventKind::Regulation => "Regulation",
            EventKind::Neutral => "Neutral",
            EventKind::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Investment" => EventKind::Investment,
            "Innovation" => EventKind::Innovation,
            "Partnership" => EventKind::Partnership,
            "Regulation" => EventKind::Regulation,
            "Neutral" => EventKind::Neutral,
            _ => EventKind::Other(s),
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        EventKind::from(s.to_string())
    }
}

impl From<EventKind> for String {
    fn from(k: EventKind) -> Self {
        match k {
            EventKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome label shown next to an event ("Success", "Positive", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Success,
    Positive,
    Negative,
    Neutral,
    Other(String),
}

impl Outcome {
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Success => "Success",
            Outcome::Positive => "Positive",
            Outcome::Negative => "Negative",
            Outcome::Neutral => "Neutral",
            Outcome::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Outcome {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Success" => Outcome::Success,
            "Positive" => Outcome::Positive,
            "Negative" => Outcome::Negative,
            "Neutral" => Outcome::Neutral,
            _ => Outcome::Other(s),
        }
    }
}

impl From<&str> for Outcome {
    fn from(s: &str) -> Self {
        Outcome::from(s.to_string())
    }
}

impl From<Outcome> for String {
    fn from(o: Outcome) -> Self {
        match o {
            Outcome::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_kind() -> EventKind {
    EventKind::Neutral
}

fn default_outcome() -> Outcome {
    Outcome::Neutral
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: EventKind,
    #[serde(default = "default_outcome")]
    pub outcome: Outcome,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Event {
    /// Best-effort parse of `date`. Accepts RFC 3339, RFC 2822,
    /// `YYYY-MM-DD HH:MM:SS` (feed proxies) and bare `YYYY-MM-DD`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.date)
    }

    /// Stable identity of the underlying news item, used to skip items that
    /// are already in the log: the url, else `title|source`. The date is left
    /// out because undated feed items are stamped with the refresh time.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match self.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => hasher.update(url.as_bytes()),
            None => {
                hasher.update(self.title.as_deref().unwrap_or_default().as_bytes());
                hasher.update(b"|");
                hasher.update(self.source.as_bytes());
            }
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Newest first; events with unparseable dates sink to the end and keep
/// their relative order.
pub fn sort_newest_first(events: &mut [Event]) {
    events.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(date: &str, kind: &str) -> Event {
        Event {
            date: date.into(),
            kind: kind.into(),
            outcome: Outcome::Success,
            source: "RSS".into(),
            amount: None,
            title: None,
            url: None,
        }
    }

    #[test]
    fn unknown_labels_round_trip() {
        let raw = r#"{"date":"2024-01-15","type":"Layoffs","outcome":"Ongoing","source":"Wire","amount":null}"#;
        let e: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(e.kind, EventKind::Other("Layoffs".into()));
        assert_eq!(e.outcome, Outcome::Other("Ongoing".into()));
        let back = serde_json::to_value(&e).unwrap();
        assert_eq!(back["type"], "Layoffs");
        assert_eq!(back["outcome"], "Ongoing");
        assert!(back.get("title").is_none());
    }

    #[test]
    fn parses_the_date_shapes_seen_in_rows() {
        assert!(parse_event_date("2024-01-15T10:00:00Z").is_some());
        assert!(parse_event_date("Mon, 15 Jan 2024 10:00:00 GMT").is_some());
        assert!(parse_event_date("2024-01-15 10:00:00").is_some());
        assert!(parse_event_date("2024-01-15").is_some());
        assert!(parse_event_date("yesterday").is_none());
    }

    #[test]
    fn sorting_puts_newest_first_and_unknown_last() {
        let mut v = vec![
            ev("2024-01-01", "Investment"),
            ev("garbage", "Neutral"),
            ev("2024-03-01", "Innovation"),
        ];
        sort_newest_first(&mut v);
        assert_eq!(v[0].date, "2024-03-01");
        assert_eq!(v[1].date, "2024-01-01");
        assert_eq!(v[2].date, "garbage");
    }

    #[test]
    fn fingerprint_is_url_else_title_and_source() {
        let mut a = ev("2024-01-01", "Investment");
        a.url = Some("https://example.com/a".into());
        let mut b = ev("2025-05-05", "Neutral");
        b.url = Some("https://example.com/a".into());
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = ev("2024-01-01", "Investment");
        c.title = Some("Acme launches app".into());
        let mut d = ev("2024-01-02T09:30:00Z", "Investment");
        d.title = Some("Acme launches app".into());
        assert_eq!(c.fingerprint(), d.fingerprint());
        assert_eq!(c.fingerprint().len(), 64);

        d.source = "Wire".into();
        assert_ne!(c.fingerprint(), d.fingerprint());
        d.source = "RSS".into();
        d.title = Some("Acme raises $5M".into());
        assert_ne!(c.fingerprint(), d.fingerprint());
    }
}

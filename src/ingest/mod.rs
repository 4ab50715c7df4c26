// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::FeedItem;
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_total", "Items parsed from news feeds.");
        describe_counter!("feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 500 chars (headlines only)
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }

    out
}

/// Drop empty titles and repeats inside one feed response.
/// Items are keyed by url, falling back to the lowercased title.
/// Returns (kept, dropped).
pub fn dedupe_batch(items: Vec<FeedItem>) -> (Vec<FeedItem>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;

    for it in items {
        if it.title.is_empty() {
            dropped += 1;
            continue;
        }
        let key = it
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| it.title.to_lowercase());
        if !seen.insert(key) {
            dropped += 1;
            continue;
        }
        keep.push(it);
    }

    (keep, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, url: Option<&str>) -> FeedItem {
        FeedItem {
            title: title.into(),
            url: url.map(Into::into),
            published_at: None,
            source: None,
        }
    }

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "  <b>PayFlow</b>&nbsp;&nbsp;raises&amp;grows  ";
        assert_eq!(normalize_text(s), "PayFlow raises&grows");
    }

    #[test]
    fn normalize_text_ascii_quotes() {
        assert_eq!(normalize_text("\u{201C}Hi\u{201D} it\u{2019}s"), "\"Hi\" it's");
    }

    #[test]
    fn batch_dedup_by_url_then_title() {
        let raw = vec![
            item("A", Some("https://x/1")),
            item("A again", Some("https://x/1")),
            item("Same Title", None),
            item("same title", None),
            item("", None),
            item("B", Some("https://x/2")),
        ];
        let (kept, dropped) = dedupe_batch(raw);
        assert_eq!(kept.len(), 3);
        assert_eq!(dropped, 3);
    }
}

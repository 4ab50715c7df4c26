// src/config/app.rs
//! Process configuration read from the environment (after `.env`).

use std::env;
use std::time::Duration;

use crate::ingest::providers::{google_news, news_api};
use crate::tracker::Plan;

pub const DEFAULT_LOGO_BASE_URL: &str = "https://logo.clearbit.com";
pub const DEFAULT_SIGN_IN_URL: &str = "/sign-in";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub news_api_key: Option<String>,
    pub news_api_base_url: String,
    pub feed_base_url: String,
    pub logo_base_url: String,
    pub sign_in_url: String,
    pub plan: Plan,
    pub refresh_interval: Option<Duration>,
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First non-empty of `names`.
fn var_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| var(n))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            news_api_key: None,
            news_api_base_url: news_api::DEFAULT_BASE_URL.to_string(),
            feed_base_url: google_news::DEFAULT_BASE_URL.to_string(),
            logo_base_url: DEFAULT_LOGO_BASE_URL.to_string(),
            sign_in_url: DEFAULT_SIGN_IN_URL.to_string(),
            plan: Plan::Free,
            refresh_interval: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let refresh_interval = var("REFRESH_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&s| s > 0)
            .map(Duration::from_secs);

        Self {
            supabase_url: var_any(&["SUPABASE_URL", "VITE_SUPABASE_URL"]),
            supabase_key: var_any(&["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]),
            news_api_key: var_any(&["NEWS_API_KEY", "VITE_NEWS_API_KEY"]),
            news_api_base_url: var("NEWS_API_BASE_URL").unwrap_or(d.news_api_base_url),
            feed_base_url: var("FEED_BASE_URL").unwrap_or(d.feed_base_url),
            logo_base_url: var("LOGO_BASE_URL").unwrap_or(d.logo_base_url),
            sign_in_url: var("SIGN_IN_URL").unwrap_or(d.sign_in_url),
            plan: var("PLAN").and_then(|p| p.parse().ok()).unwrap_or(d.plan),
            refresh_interval,
        }
    }

    /// Both halves of the table-store connection, if configured.
    pub fn supabase(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(u), Some(k)) => Some((u.as_str(), k.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "SUPABASE_URL",
        "VITE_SUPABASE_URL",
        "SUPABASE_ANON_KEY",
        "VITE_SUPABASE_ANON_KEY",
        "NEWS_API_KEY",
        "VITE_NEWS_API_KEY",
        "LOGO_BASE_URL",
        "PLAN",
        "REFRESH_INTERVAL_SECS",
    ];

    fn clear() {
        for v in VARS {
            env::remove_var(v);
        }
    }

    #[serial_test::serial]
    #[test]
    fn defaults_without_env() {
        clear();
        let cfg = AppConfig::from_env();
        assert!(cfg.supabase().is_none());
        assert_eq!(cfg.logo_base_url, DEFAULT_LOGO_BASE_URL);
        assert_eq!(cfg.plan, Plan::Free);
        assert!(cfg.refresh_interval.is_none());
    }

    #[serial_test::serial]
    #[test]
    fn vite_names_are_fallbacks() {
        clear();
        env::set_var("VITE_SUPABASE_URL", "https://x.supabase.co");
        env::set_var("SUPABASE_ANON_KEY", "anon");
        env::set_var("PLAN", "premium");
        env::set_var("REFRESH_INTERVAL_SECS", "300");
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.supabase(), Some(("https://x.supabase.co", "anon")));
        assert_eq!(cfg.plan, Plan::Premium);
        assert_eq!(cfg.refresh_interval, Some(Duration::from_secs(300)));
        clear();
    }
}

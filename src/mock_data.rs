//! Static datasets shipped with the binary (alerts feed, keyword trend
//! series, report history). Parsed once on first use.

use once_cell::sync::Lazy;

use crate::model::{Alert, Report, TrendPoint};

static ALERTS: Lazy<Vec<Alert>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/alerts.json"))
        .expect("embedded data/alerts.json is valid")
});

static MARKET_TRENDS: Lazy<Vec<TrendPoint>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/market_trends.json"))
        .expect("embedded data/market_trends.json is valid")
});

static REPORTS: Lazy<Vec<Report>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/reports.json"))
        .expect("embedded data/reports.json is valid")
});

/// Keywords offered by the trends screen.
pub const TREND_KEYWORDS: &[&str] = &[
    "fintech",
    "digital payments",
    "blockchain",
    "cryptocurrency",
    "neobank",
    "open banking",
];

pub fn alerts() -> &'static [Alert] {
    &ALERTS
}

pub fn market_trends() -> &'static [TrendPoint] {
    &MARKET_TRENDS
}

pub fn report_history() -> &'static [Report] {
    &REPORTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertType;

    #[test]
    fn datasets_parse() {
        assert_eq!(alerts().len(), 10);
        assert!(alerts().iter().any(|a| a.kind == AlertType::Executive));
        assert_eq!(alerts().iter().filter(|a| a.competitor.is_none()).count(), 4);

        assert_eq!(market_trends().len(), 270);
        assert!(market_trends().iter().all(|p| p.value.is_finite()));

        assert_eq!(report_history().len(), 4);
        assert_eq!(report_history()[0].title, "Q4 2023 Competitive Intelligence Report");
    }
}

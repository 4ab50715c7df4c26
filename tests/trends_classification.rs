// tests/trends_classification.rs
//
// 14-day windows: trailing 7-day mean against the prior 7-day mean, with a
// 10% band either way.

use chrono::NaiveDate;
use intemint::mock_data;
use intemint::model::{Trend, TrendPoint};
use intemint::trends::{classify_trend, keyword_trends, series, TimeRange};

fn window(prev: f64, recent: f64) -> Vec<TrendPoint> {
    let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..14)
        .map(|i| TrendPoint {
            date: d0 + chrono::Days::new(i),
            value: if i < 7 { prev } else { recent },
            keyword: "fintech".into(),
        })
        .collect()
}

#[test]
fn up_down_neutral() {
    assert_eq!(classify_trend(&window(50.0, 60.0)), Trend::Up);
    assert_eq!(classify_trend(&window(50.0, 40.0)), Trend::Down);
    assert_eq!(classify_trend(&window(50.0, 52.0)), Trend::Neutral);
    assert_eq!(classify_trend(&window(50.0, 47.0)), Trend::Neutral);
}

#[test]
fn band_edges_are_neutral() {
    // Exactly +10% / -10% is not strictly beyond the band.
    assert_eq!(classify_trend(&window(100.0, 110.0)), Trend::Neutral);
    assert_eq!(classify_trend(&window(100.0, 90.0)), Trend::Neutral);
    assert_eq!(classify_trend(&window(100.0, 110.5)), Trend::Up);
    assert_eq!(classify_trend(&window(100.0, 89.5)), Trend::Down);
}

#[test]
fn only_last_fourteen_points_matter() {
    let mut pts = window(10.0, 10.0);
    // Older history far below does not affect the result.
    let d0 = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
    let older: Vec<TrendPoint> = (0..10)
        .map(|i| TrendPoint {
            date: d0 + chrono::Days::new(i),
            value: 1.0,
            keyword: "fintech".into(),
        })
        .collect();
    pts.splice(0..0, older);
    assert_eq!(classify_trend(&pts), Trend::Neutral);
}

#[test]
fn shipped_series_cover_every_range() {
    let data = mock_data::market_trends();
    for kw in ["fintech", "digital payments", "blockchain"] {
        assert_eq!(series(data, kw, TimeRange::D7).len(), 7);
        assert_eq!(series(data, kw, TimeRange::D30).len(), 30);
        assert_eq!(series(data, kw, TimeRange::D90).len(), 90);
    }

    let kws = vec!["fintech".to_string(), "neobank".to_string()];
    let out = keyword_trends(data, &kws, TimeRange::D30);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].points.len(), 30);
    assert!(out[1].points.is_empty());
    assert_eq!(out[1].trend, Trend::Neutral);
}

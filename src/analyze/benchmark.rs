use crate::model::{Event, EventKind};

/// Weighted event mix: `(2 × Investment + Innovation) / total`.
/// Zero for an empty log.
pub fn benchmark_score(events: &[Event]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let (invest, innov) = events.iter().fold((0u32, 0u32), |(i, n), e| match e.kind {
        EventKind::Investment => (i + 1, n),
        EventKind::Innovation => (i, n + 1),
        _ => (i, n),
    });
    f64::from(2 * invest + innov) / events.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;

    fn ev(kind: &str) -> Event {
        Event {
            date: "2024-01-01".into(),
            kind: kind.into(),
            outcome: Outcome::Neutral,
            source: "RSS".into(),
            amount: None,
            title: None,
            url: None,
        }
    }

    #[test]
    fn empty_log_scores_zero() {
        assert_eq!(benchmark_score(&[]), 0.0);
    }

    #[test]
    fn mixed_log_matches_weighted_ratio() {
        let events = [ev("Investment"), ev("Innovation"), ev("Neutral")];
        assert!((benchmark_score(&events) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn all_investment_scores_two() {
        let events = [ev("Investment"), ev("Investment")];
        assert!((benchmark_score(&events) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_types_only_dilute() {
        let events = [ev("Innovation"), ev("Layoffs"), ev("Layoffs"), ev("Layoffs")];
        assert!((benchmark_score(&events) - 0.25).abs() < f64::EPSILON);
    }
}

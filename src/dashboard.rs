use serde::Serialize;

use crate::alerts::ReadState;
use crate::model::{Alert, Competitor, Priority};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub tracked_competitors: usize,
    pub alerts: usize,
    pub unread_alerts: usize,
    pub high_priority_alerts: usize,
    /// Mean over competitors that have a score; absent when none do.
    pub average_benchmark_score: Option<f64>,
}

pub fn overview(competitors: &[Competitor], alerts: &[Alert], read: &ReadState) -> Overview {
    let scores: Vec<f64> = competitors.iter().filter_map(|c| c.benchmark_score).collect();
    let average_benchmark_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    Overview {
        tracked_competitors: competitors.len(),
        alerts: alerts.len(),
        unread_alerts: read.unread_count(alerts),
        high_priority_alerts: alerts.iter().filter(|a| a.priority == Priority::High).count(),
        average_benchmark_score,
    }
}

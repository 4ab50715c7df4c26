//! Report history and on-demand report generation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use tracing::info;

use crate::analyze::benchmark_score;
use crate::model::{Competitor, Event, EventKind, Report, ReportType, UserIdentity};
use crate::trends::TimeRange;

/// Generated reports kept per user; older ones are dropped first.
pub const MAX_GENERATED_PER_USER: usize = 50;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReportError {
    #[error("Please select at least one competitor")]
    NoSelection,

    #[error("unknown competitor: {0}")]
    UnknownCompetitor(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReport {
    pub competitors: Vec<String>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(rename = "type")]
    pub kind: ReportType,
}

/// Shipped history plus reports generated in this process, per user.
pub struct ReportDesk {
    history: Vec<Report>,
    generated: RwLock<HashMap<String, Vec<Report>>>,
}

impl ReportDesk {
    pub fn new(history: Vec<Report>) -> Self {
        Self {
            history,
            generated: RwLock::new(HashMap::new()),
        }
    }

    /// User's generated reports (newest first) followed by the history.
    pub fn list(&self, user: &UserIdentity) -> Vec<Report> {
        let generated = self.generated.read().expect("report desk poisoned");
        let mut out: Vec<Report> = generated
            .get(&user.id)
            .map(|v| v.iter().rev().cloned().collect())
            .unwrap_or_default();
        out.extend(self.history.iter().cloned());
        out
    }

    /// `owned` is the user's competitor list; every selected id must be in it.
    pub fn generate(
        &self,
        user: &UserIdentity,
        req: &GenerateReport,
        owned: &[Competitor],
        today: NaiveDate,
    ) -> Result<Report, ReportError> {
        if req.competitors.is_empty() {
            return Err(ReportError::NoSelection);
        }
        let selected = req
            .competitors
            .iter()
            .map(|id| {
                owned
                    .iter()
                    .find(|c| &c.id == id)
                    .ok_or_else(|| ReportError::UnknownCompetitor(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let report = Report {
            id: uuid::Uuid::new_v4().to_string(),
            title: format!("{} - {}", req.kind.label(), today.format("%B %-d, %Y")),
            summary: summarize(&selected, req.time_range, today),
            date_generated: today,
            kind: req.kind,
        };

        {
            let mut generated = self.generated.write().expect("report desk poisoned");
            let mine = generated.entry(user.id.clone()).or_default();
            mine.push(report.clone());
            if mine.len() > MAX_GENERATED_PER_USER {
                let excess = mine.len() - MAX_GENERATED_PER_USER;
                mine.drain(..excess);
            }
        }
        info!(target: "reports", user = %user.id, id = %report.id, kind = ?req.kind, "report generated");
        Ok(report)
    }
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn in_range(e: &Event, since: NaiveDate) -> bool {
    e.timestamp().is_some_and(|t| t.date_naive() >= since)
}

/// Deterministic text over the selected competitors' events inside the range.
fn summarize(selected: &[&Competitor], range: TimeRange, today: NaiveDate) -> String {
    let since = today - Duration::days(range.days() as i64);
    let mut investments = 0usize;
    let mut innovations = 0usize;
    let mut total = 0usize;
    let mut lines = Vec::with_capacity(selected.len());

    for c in selected {
        let events: Vec<Event> = c
            .events()
            .iter()
            .filter(|e| in_range(e, since))
            .cloned()
            .collect();
        total += events.len();
        investments += events.iter().filter(|e| e.kind == EventKind::Investment).count();
        innovations += events.iter().filter(|e| e.kind == EventKind::Innovation).count();
        lines.push(format!(
            "{}: {}, benchmark {:.2}",
            c.name,
            count(events.len(), "event"),
            benchmark_score(&events)
        ));
    }

    format!(
        "{}, {} in the last {} days ({} investment, {} innovation). {}.",
        count(selected.len(), "competitor"),
        count(total, "event"),
        range.days(),
        investments,
        innovations,
        lines.join("; ")
    )
}

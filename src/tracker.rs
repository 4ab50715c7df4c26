//! Competitor tracker: add/edit/remove rows for the signed-in user, with the
//! free-plan cap.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::enrichment::company_preview;
use crate::model::event::sort_newest_first;
use crate::model::{Competitor, CompetitorUpdate, Event, NewCompetitor, UserIdentity};
use crate::store::{CompetitorStore, StoreError};

pub const FREE_COMPETITOR_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    pub fn competitor_limit(self) -> Option<usize> {
        match self {
            Plan::Free => Some(FREE_COMPETITOR_LIMIT),
            Plan::Premium => None,
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "premium" => Ok(Plan::Premium),
            other => Err(format!("unknown plan: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Website is required")]
    MissingWebsite,

    #[error("{0}")]
    Preview(String),

    #[error("Free users can only add up to {FREE_COMPETITOR_LIMIT} competitors.")]
    LimitReached,

    #[error("Nothing to update")]
    EmptyUpdate,

    #[error("competitor not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TrackerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => TrackerError::NotFound(id),
            other => TrackerError::Store(other),
        }
    }
}

/// Event list filters of the competitor detail view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub outcome: Option<String>,
    /// Only events from the last 30 days.
    #[serde(default)]
    pub recent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventsView {
    pub events: Vec<Event>,
    /// Distinct event types over the whole log, in display order.
    pub types: Vec<String>,
}

/// `None` and `"all"` both mean no constraint.
fn wanted(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case("all"))
}

/// Sorts newest first, then applies `q`. Undated events never count as recent.
pub fn filter_events(events: &[Event], q: &EventQuery, now: DateTime<Utc>) -> EventsView {
    let mut sorted = events.to_vec();
    sort_newest_first(&mut sorted);

    let mut seen = HashSet::new();
    let types = sorted
        .iter()
        .map(|e| e.kind.as_str().to_string())
        .filter(|t| seen.insert(t.clone()))
        .collect();

    let cutoff = now - Duration::days(30);
    let kind = wanted(&q.kind);
    let outcome = wanted(&q.outcome);
    let events = sorted
        .into_iter()
        .filter(|e| kind.map_or(true, |k| e.kind.as_str() == k))
        .filter(|e| outcome.map_or(true, |o| e.outcome.as_str() == o))
        .filter(|e| !q.recent || e.timestamp().is_some_and(|t| t >= cutoff))
        .collect();

    EventsView { events, types }
}

/// Free plan shows only the first `FREE_COMPETITOR_LIMIT` rows.
pub fn visible(plan: Plan, list: &[Competitor]) -> &[Competitor] {
    match plan.competitor_limit() {
        Some(n) => &list[..list.len().min(n)],
        None => list,
    }
}

pub struct Tracker {
    store: Arc<dyn CompetitorStore>,
    plan: Plan,
    logo_base_url: String,
}

impl Tracker {
    pub fn new(store: Arc<dyn CompetitorStore>, plan: Plan, logo_base_url: &str) -> Self {
        Self {
            store,
            plan,
            logo_base_url: logo_base_url.to_string(),
        }
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub async fn list(&self, user: &UserIdentity) -> Result<Vec<Competitor>, TrackerError> {
        Ok(self.store.list_for_owner(&user.id).await?)
    }

    pub async fn add(
        &self,
        user: &UserIdentity,
        website: &str,
        name: Option<&str>,
    ) -> Result<Competitor, TrackerError> {
        let website = website.trim();
        if website.is_empty() {
            return Err(TrackerError::MissingWebsite);
        }
        let preview = company_preview(website, &self.logo_base_url);
        if let Some(err) = preview.error {
            return Err(TrackerError::Preview(err));
        }

        if let Some(limit) = self.plan.competitor_limit() {
            let owned = self.store.list_for_owner(&user.id).await?;
            if owned.len() >= limit {
                return Err(TrackerError::LimitReached);
            }
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or(preview.name);

        let row = NewCompetitor {
            user_id: user.id.clone(),
            name,
            website: website.to_string(),
            logo_url: Some(preview.logo).filter(|l| !l.is_empty()),
            industry: preview.industry.filter(|s| !s.is_empty()),
            description: preview.description.filter(|s| !s.is_empty()),
            founded_year: preview.founded_year,
            employee_count: preview.employee_count,
            headquarters: preview.headquarters.filter(|s| !s.is_empty()),
            social_links: Some(preview.social_links).filter(|s| !s.is_empty()),
        };
        let created = self.store.insert(row).await?;
        info!(target: "tracker", user = %user.id, id = %created.id, "competitor added");
        Ok(created)
    }

    /// Own row or `NotFound`; other users' rows are indistinguishable from
    /// missing ones.
    async fn owned(&self, user: &UserIdentity, id: &str) -> Result<Competitor, TrackerError> {
        match self.store.get(id).await? {
            Some(c) if c.user_id == user.id => Ok(c),
            _ => Err(TrackerError::NotFound(id.to_string())),
        }
    }

    pub async fn get(&self, user: &UserIdentity, id: &str) -> Result<Competitor, TrackerError> {
        self.owned(user, id).await
    }

    pub async fn update(
        &self,
        user: &UserIdentity,
        id: &str,
        patch: &CompetitorUpdate,
    ) -> Result<Competitor, TrackerError> {
        if patch.is_empty() {
            return Err(TrackerError::EmptyUpdate);
        }
        self.owned(user, id).await?;
        Ok(self.store.update(id, patch).await?)
    }

    /// Never consults the plan limit.
    pub async fn delete(&self, user: &UserIdentity, id: &str) -> Result<(), TrackerError> {
        self.owned(user, id).await?;
        self.store.delete(id).await?;
        info!(target: "tracker", user = %user.id, id = %id, "competitor removed");
        Ok(())
    }

    pub async fn events(
        &self,
        user: &UserIdentity,
        id: &str,
        q: &EventQuery,
    ) -> Result<EventsView, TrackerError> {
        let c = self.owned(user, id).await?;
        Ok(filter_events(c.events(), q, Utc::now()))
    }
}

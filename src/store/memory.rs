use std::sync::RwLock;

use chrono::Utc;

use super::{CompetitorStore, StoreError, StoreResult};
use crate::model::{Competitor, CompetitorUpdate, DerivedColumns, NewCompetitor};

/// Process-local table. Writes stamp `created_at`/`updated_at` like the
/// hosted table's defaults do.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Competitor>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Competitor>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Copy of the current rows in storage order.
    pub fn snapshot(&self) -> Vec<Competitor> {
        self.rows.read().expect("memory store lock poisoned").clone()
    }
}

fn newest_first(rows: &mut [Competitor]) {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait::async_trait]
impl CompetitorStore for MemoryStore {
    async fn list_for_owner(&self, user_id: &str) -> StoreResult<Vec<Competitor>> {
        let mut out: Vec<Competitor> = self
            .rows
            .read()
            .expect("memory store lock poisoned")
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut out);
        Ok(out)
    }

    async fn list_all(&self) -> StoreResult<Vec<Competitor>> {
        Ok(self.snapshot())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Competitor>> {
        let rows = self.rows.read().expect("memory store lock poisoned");
        Ok(rows.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, row: NewCompetitor) -> StoreResult<Competitor> {
        let now = Utc::now();
        let c = Competitor {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: row.user_id,
            name: row.name,
            website: row.website,
            logo_url: row.logo_url,
            industry: row.industry,
            description: row.description,
            founded_year: row.founded_year,
            employee_count: row.employee_count,
            headquarters: row.headquarters,
            social_links: row.social_links,
            events: None,
            benchmark_score: None,
            last_summary: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.rows
            .write()
            .expect("memory store lock poisoned")
            .push(c.clone());
        Ok(c)
    }

    async fn update(&self, id: &str, patch: &CompetitorUpdate) -> StoreResult<Competitor> {
        let mut rows = self.rows.write().expect("memory store lock poisoned");
        let row = rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(row);
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut rows = self.rows.write().expect("memory store lock poisoned");
        let before = rows.len();
        rows.retain(|c| c.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn write_derived(&self, cols: &DerivedColumns) -> StoreResult<()> {
        let mut rows = self.rows.write().expect("memory store lock poisoned");
        let row = rows
            .iter_mut()
            .find(|c| c.id == cols.id)
            .ok_or_else(|| StoreError::NotFound(cols.id.clone()))?;
        row.events = Some(cols.events.clone());
        row.benchmark_score = Some(cols.benchmark_score);
        if let Some(summary) = &cols.last_summary {
            row.last_summary = Some(summary.clone());
        }
        row.updated_at = Some(Utc::now());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

//! Access to the hosted `competitors` table.
//!
//! Everything that reads or writes competitor rows goes through
//! [`CompetitorStore`]; the PostgREST adapter talks to the hosted service and
//! the in-memory store backs tests and local runs.

pub mod memory;
pub mod supabase;

use crate::model::{Competitor, CompetitorUpdate, DerivedColumns, NewCompetitor};

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("competitor not found: {0}")]
    NotFound(String),

    #[error("table store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("table store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode table store response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait::async_trait]
pub trait CompetitorStore: Send + Sync {
    /// Rows owned by `user_id`, newest first.
    async fn list_for_owner(&self, user_id: &str) -> StoreResult<Vec<Competitor>>;

    /// Every row, regardless of owner. Used by the refresh job.
    async fn list_all(&self) -> StoreResult<Vec<Competitor>>;

    async fn get(&self, id: &str) -> StoreResult<Option<Competitor>>;

    async fn insert(&self, row: NewCompetitor) -> StoreResult<Competitor>;

    async fn update(&self, id: &str, patch: &CompetitorUpdate) -> StoreResult<Competitor>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Merge the refresh-derived columns into the row keyed by `cols.id`.
    async fn write_derived(&self, cols: &DerivedColumns) -> StoreResult<()>;

    fn name(&self) -> &'static str;
}

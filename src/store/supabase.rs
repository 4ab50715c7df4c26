//! PostgREST adapter for the hosted `competitors` table.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{CompetitorStore, StoreError, StoreResult};
use crate::model::{Competitor, CompetitorUpdate, DerivedColumns, NewCompetitor};

const TABLE: &str = "competitors";

pub struct SupabaseStore {
    http: Client,
    table_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("intemint/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            table_url: format!("{}/rest/v1/{TABLE}", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn checked(resp: Response) -> StoreResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn rows<T: DeserializeOwned>(resp: Response) -> StoreResult<Vec<T>> {
        let bytes = Self::checked(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn eq(v: &str) -> String {
    format!("eq.{v}")
}

#[async_trait::async_trait]
impl CompetitorStore for SupabaseStore {
    async fn list_for_owner(&self, user_id: &str) -> StoreResult<Vec<Competitor>> {
        let resp = self
            .authed(self.http.get(&self.table_url))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn list_all(&self) -> StoreResult<Vec<Competitor>> {
        let resp = self
            .authed(self.http.get(&self.table_url))
            .query(&[("select", "*")])
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Competitor>> {
        let resp = self
            .authed(self.http.get(&self.table_url))
            .query(&[("select", "*".to_string()), ("id", eq(id))])
            .send()
            .await?;
        Ok(Self::rows(resp).await?.into_iter().next())
    }

    async fn insert(&self, row: NewCompetitor) -> StoreResult<Competitor> {
        let resp = self
            .authed(self.http.post(&self.table_url))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        Self::rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Status {
                status: 200,
                body: "insert returned no rows".into(),
            })
    }

    async fn update(&self, id: &str, patch: &CompetitorUpdate) -> StoreResult<Competitor> {
        let resp = self
            .authed(self.http.patch(&self.table_url))
            .header("Prefer", "return=representation")
            .query(&[("id", eq(id))])
            .json(patch)
            .send()
            .await?;
        Self::rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let resp = self
            .authed(self.http.delete(&self.table_url))
            .header("Prefer", "return=representation")
            .query(&[("id", eq(id))])
            .send()
            .await?;
        let gone: Vec<serde_json::Value> = Self::rows(resp).await?;
        if gone.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Upsert with `merge-duplicates`: only the columns in the payload are
    /// written on conflict.
    async fn write_derived(&self, cols: &DerivedColumns) -> StoreResult<()> {
        let resp = self
            .authed(self.http.post(&self.table_url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "id")])
            .json(&[cols])
            .send()
            .await?;
        Self::checked(resp).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_is_normalized() {
        let s = SupabaseStore::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(s.table_url(), "https://abc.supabase.co/rest/v1/competitors");
    }
}

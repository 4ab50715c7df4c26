//! One refresh pass over every competitor, then exit.
//! Non-zero exit only when the pass cannot start or the listing fails.

use anyhow::Context;
use tracing::{info, warn};

use intemint::config::AppConfig;
use intemint::store::SupabaseStore;
use intemint::{telemetry, NewsRefresher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing("intemint=info,news_refresh=info,warn");

    let config = AppConfig::from_env();
    let (url, key) = config
        .supabase()
        .context("SUPABASE_URL and SUPABASE_ANON_KEY must be set")?;
    let store = SupabaseStore::new(url, key)?;

    let refresher = NewsRefresher::from_config(std::sync::Arc::new(store), &config)?;
    let report = refresher.run_once().await?;

    for f in &report.failed {
        warn!(id = %f.id, error = %f.error, "competitor not refreshed");
    }
    info!(
        processed = report.processed,
        updated = report.updated.len(),
        failed = report.failed.len(),
        "Done"
    );
    Ok(())
}

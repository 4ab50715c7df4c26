//! Competitive-intelligence service: binary entrypoint.
//! Boots the Axum HTTP server with shared state, middleware and the optional
//! periodic news refresh.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};

use intemint::config::AppConfig;
use intemint::metrics::Metrics;
use intemint::poller::Poller;
use intemint::{api, telemetry, AppState, NewsRefresher};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing("intemint=info,warn");
    Metrics::global();

    let config = AppConfig::from_env();
    let store = AppState::store_from_config(&config)?;
    let mut state = AppState::new(store.clone(), config.clone())?;

    if let Some(period) = config.refresh_interval {
        let refresher = Arc::new(NewsRefresher::from_config(store, &config)?);
        let poller = Poller::spawn("news_refresh", period, move || {
            let r = refresher.clone();
            async move {
                if let Err(e) = r.run_once().await {
                    warn!(target: "refresh", error = %format!("{e:#}"), "refresh pass aborted");
                }
            }
        });
        state = state.with_refresh(poller);
        info!(period_secs = period.as_secs(), "periodic news refresh enabled");
    }

    let router = api::router(state);
    Ok(router.into())
}

// src/lib.rs
// Public library surface for the server, the refresh job and integration tests.

pub mod alerts;
pub mod analyze;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod enrichment;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod mock_data;
pub mod model;
pub mod poller;
pub mod refresh;
pub mod reports;
pub mod store;
pub mod telemetry;
pub mod tracker;
pub mod trends;

pub use crate::api::{router, AppState};
pub use crate::refresh::{NewsRefresher, RefreshReport};

//! HTTP error type. Every handler error renders as JSON `{ error, code }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::reports::ReportError;
use crate::tracker::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No identity from the auth provider; carries where to sign in.
    #[error("Please sign in")]
    Unauthorized { sign_in_url: String },

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A dependency is not configured (e.g. missing API key).
    #[error("{0}")]
    Unavailable(String),

    /// A third-party call failed.
    #[error("{0}")]
    Upstream(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized { sign_in_url } => {
                let body = json!({
                    "error": self.to_string(),
                    "code": "UNAUTHORIZED",
                    "sign_in_url": sign_in_url,
                });
                return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
            }

            AppError::Tracker(e) => match e {
                TrackerError::MissingWebsite
                | TrackerError::Preview(_)
                | TrackerError::EmptyUpdate => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                TrackerError::LimitReached => (StatusCode::FORBIDDEN, "PLAN_LIMIT", e.to_string()),
                TrackerError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                TrackerError::Store(inner) => {
                    tracing::error!(error = %inner, "table store error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The data store is unavailable".to_string(),
                    )
                }
            },

            AppError::Report(e) => match e {
                ReportError::NoSelection => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                ReportError::UnknownCompetitor(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "upstream call failed");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

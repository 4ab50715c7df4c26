use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Context;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use tracing::warn;

use crate::alerts::{competitor_names, AlertFilter, ReadState};
use crate::config::AppConfig;
use crate::dashboard::{self, Overview};
use crate::enrichment::{company_preview, CompanyPreview};
use crate::error::{AppError, AppResult};
use crate::ingest::providers::news_api::NewsApiClient;
use crate::metrics::Metrics;
use crate::mock_data;
use crate::model::{Alert, Competitor, CompetitorUpdate, NewsArticle, Report, UserIdentity};
use crate::poller::Poller;
use crate::reports::{GenerateReport, ReportDesk};
use crate::store::{CompetitorStore, MemoryStore, SupabaseStore};
use crate::tracker::{self, EventQuery, EventsView, Tracker};
use crate::trends::{self, KeywordCount, KeywordSet, KeywordTrend, TimeRange};

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_NAME: &str = "x-user-name";
pub const HEADER_USER_EMAIL: &str = "x-user-email";

const DEFAULT_INDUSTRY: &str = "SaaS";

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
    pub news: Arc<NewsApiClient>,
    pub reports: Arc<ReportDesk>,
    reads: Arc<RwLock<HashMap<String, ReadState>>>,
    pub config: Arc<AppConfig>,
    /// Background refresh, stopped when the last state clone is dropped.
    refresh: Option<Arc<Poller>>,
}

impl AppState {
    pub fn new(store: Arc<dyn CompetitorStore>, config: AppConfig) -> anyhow::Result<Self> {
        let tracker = Tracker::new(store, config.plan, &config.logo_base_url);
        let news = NewsApiClient::new(&config.news_api_base_url, config.news_api_key.clone())?;
        Ok(Self {
            tracker: Arc::new(tracker),
            news: Arc::new(news),
            reports: Arc::new(ReportDesk::new(mock_data::report_history().to_vec())),
            reads: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            refresh: None,
        })
    }

    /// Table store from config; in-memory when the hosted store is not set.
    pub fn store_from_config(config: &AppConfig) -> anyhow::Result<Arc<dyn CompetitorStore>> {
        match config.supabase() {
            Some((url, key)) => Ok(Arc::new(
                SupabaseStore::new(url, key).context("building table store client")?,
            )),
            None => {
                warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set; using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    pub fn with_refresh(mut self, poller: Poller) -> Self {
        self.refresh = Some(Arc::new(poller));
        self
    }
}

/// Identity supplied by the hosted auth provider.
pub struct AuthUser(pub UserIdentity);

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(id) = header(&parts.headers, HEADER_USER_ID) else {
            return Err(AppError::Unauthorized {
                sign_in_url: state.config.sign_in_url.clone(),
            });
        };
        Ok(AuthUser(UserIdentity {
            id,
            name: header(&parts.headers, HEADER_USER_NAME),
            email: header(&parts.headers, HEADER_USER_EMAIL),
        }))
    }
}

pub fn router(state: AppState) -> Router {
    with_middleware(routes(state))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/metrics", get(|| async { Metrics::global().render() }))
        .route("/competitors", get(list_competitors).post(add_competitor))
        .route("/competitors/preview", get(preview))
        .route(
            "/competitors/{id}",
            patch(update_competitor).delete(delete_competitor),
        )
        .route("/competitors/{id}/events", get(competitor_events))
        .route("/competitors/{id}/news", get(competitor_news))
        .route("/alerts", get(list_alerts))
        .route("/alerts/read-all", post(mark_all_alerts_read))
        .route("/alerts/{id}/read", post(mark_alert_read))
        .route("/trends", get(keyword_trends))
        .route("/trends/news", get(industry_news))
        .route("/reports", get(list_reports).post(generate_report))
        .route("/dashboard", get(overview))
        .with_state(state)
}

/// Panic capture and CORS.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    let body = serde_json::json!({
        "error": "An internal error occurred",
        "code": "INTERNAL_ERROR",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

// ---- competitors ----

#[derive(Serialize)]
struct CompetitorList {
    competitors: Vec<Competitor>,
    total: usize,
    limit: Option<usize>,
}

async fn list_competitors(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<CompetitorList>> {
    let all = state.tracker.list(&user).await?;
    let plan = state.tracker.plan();
    Ok(Json(CompetitorList {
        competitors: tracker::visible(plan, &all).to_vec(),
        total: all.len(),
        limit: plan.competitor_limit(),
    }))
}

#[derive(Deserialize)]
struct AddReq {
    website: String,
    #[serde(default)]
    name: Option<String>,
}

async fn add_competitor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<AddReq>,
) -> AppResult<(StatusCode, Json<Competitor>)> {
    let c = state
        .tracker
        .add(&user, &body.website, body.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(c)))
}

async fn update_competitor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<CompetitorUpdate>,
) -> AppResult<Json<Competitor>> {
    Ok(Json(state.tracker.update(&user, &id, &patch).await?))
}

async fn delete_competitor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.tracker.delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct PreviewQuery {
    #[serde(default)]
    website: String,
}

async fn preview(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<PreviewQuery>,
) -> Json<CompanyPreview> {
    Json(company_preview(&q.website, &state.config.logo_base_url))
}

async fn competitor_events(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Query(q): Query<EventQuery>,
) -> AppResult<Json<EventsView>> {
    Ok(Json(state.tracker.events(&user, &id, &q).await?))
}

fn require_news_key(news: &NewsApiClient) -> AppResult<()> {
    if news.has_key() {
        Ok(())
    } else {
        Err(AppError::Unavailable("News API key not found".to_string()))
    }
}

async fn competitor_news(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<NewsArticle>>> {
    let c = state.tracker.get(&user, &id).await?;
    require_news_key(&state.news)?;
    let industry = c.industry.as_deref().unwrap_or_default();
    let articles = state
        .news
        .competitor_news(&c.name, industry)
        .await
        .map_err(|e| AppError::Upstream(format!("{e:#}")))?;
    Ok(Json(articles))
}

// ---- alerts ----

#[derive(Deserialize, Default)]
struct AlertQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    priority: Option<String>,
    competitor: Option<String>,
}

impl AlertQuery {
    fn filter(&self) -> AppResult<AlertFilter> {
        AlertFilter::from_query(
            self.kind.as_deref(),
            self.priority.as_deref(),
            self.competitor.as_deref(),
        )
        .map_err(AppError::BadRequest)
    }
}

#[derive(Serialize)]
struct AlertView {
    #[serde(flatten)]
    alert: Alert,
    read: bool,
}

#[derive(Serialize)]
struct AlertFeed {
    alerts: Vec<AlertView>,
    unread: usize,
    competitors: Vec<String>,
}

impl AppState {
    fn read_state(&self, user: &UserIdentity) -> ReadState {
        self.reads
            .read()
            .expect("read state poisoned")
            .get(&user.id)
            .cloned()
            .unwrap_or_default()
    }

    fn update_read_state(&self, user: &UserIdentity, f: impl FnOnce(&mut ReadState)) {
        let mut all = self.reads.write().expect("read state poisoned");
        f(all.entry(user.id.clone()).or_default());
    }
}

fn alert_feed(visible: Vec<Alert>, read: &ReadState) -> AlertFeed {
    let unread = read.unread_count(&visible);
    AlertFeed {
        competitors: competitor_names(mock_data::alerts()),
        alerts: visible
            .into_iter()
            .map(|a| AlertView {
                read: read.is_read(&a.id),
                alert: a,
            })
            .collect(),
        unread,
    }
}

async fn list_alerts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<AlertQuery>,
) -> AppResult<Json<AlertFeed>> {
    let visible = q.filter()?.apply(mock_data::alerts());
    Ok(Json(alert_feed(visible, &state.read_state(&user))))
}

async fn mark_alert_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if !mock_data::alerts().iter().any(|a| a.id == id) {
        return Err(AppError::NotFound(format!("alert {id}")));
    }
    state.update_read_state(&user, |r| {
        r.mark_read(&id);
    });
    Ok(StatusCode::NO_CONTENT)
}

/// Marks the alerts visible under the given filters.
async fn mark_all_alerts_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<AlertQuery>,
) -> AppResult<Json<AlertFeed>> {
    let visible = q.filter()?.apply(mock_data::alerts());
    state.update_read_state(&user, |r| r.mark_all_read(&visible));
    Ok(Json(alert_feed(visible, &state.read_state(&user))))
}

// ---- trends ----

#[derive(Deserialize)]
struct TrendQuery {
    keywords: Option<String>,
    range: Option<String>,
}

async fn keyword_trends(
    _user: AuthUser,
    Query(q): Query<TrendQuery>,
) -> AppResult<Json<Vec<KeywordTrend>>> {
    let range = match q.range.as_deref() {
        Some(r) => r.parse::<TimeRange>().map_err(AppError::BadRequest)?,
        None => TimeRange::default(),
    };
    let mut keywords = KeywordSet::new(
        q.keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.trim().is_empty()),
    );
    if keywords.is_empty() {
        keywords = KeywordSet::new(&mock_data::TREND_KEYWORDS[..3]);
    }
    Ok(Json(trends::keyword_trends(
        mock_data::market_trends(),
        keywords.as_slice(),
        range,
    )))
}

#[derive(Deserialize)]
struct IndustryQuery {
    industry: Option<String>,
}

#[derive(Serialize)]
struct IndustryNews {
    industry: String,
    articles: Vec<NewsArticle>,
    keywords: Vec<KeywordCount>,
}

async fn industry_news(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<IndustryQuery>,
) -> AppResult<Json<IndustryNews>> {
    let industry = q
        .industry
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string());
    require_news_key(&state.news)?;
    let articles = state
        .news
        .industry_news(&industry)
        .await
        .map_err(|e| AppError::Upstream(format!("{e:#}")))?;
    let keywords = trends::trending_keywords(&articles);
    Ok(Json(IndustryNews {
        industry,
        articles,
        keywords,
    }))
}

// ---- reports / dashboard ----

async fn list_reports(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Vec<Report>> {
    Json(state.reports.list(&user))
}

async fn generate_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<GenerateReport>,
) -> AppResult<(StatusCode, Json<Report>)> {
    let owned = if req.competitors.is_empty() {
        Vec::new()
    } else {
        state.tracker.list(&user).await?
    };
    let report = state
        .reports
        .generate(&user, &req, &owned, Utc::now().date_naive())?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn overview(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Json<Overview>> {
    let competitors = state.tracker.list(&user).await?;
    let read = state.read_state(&user);
    Ok(Json(dashboard::overview(
        &competitors,
        mock_data::alerts(),
        &read,
    )))
}

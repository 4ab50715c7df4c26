// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use intemint::api::{self, AppState};
use intemint::config::AppConfig;
use intemint::store::MemoryStore;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_state() -> AppState {
    let cfg = AppConfig {
        sign_in_url: "https://auth.example/sign-in".into(),
        ..Default::default()
    };
    AppState::new(Arc::new(MemoryStore::new()), cfg).expect("state")
}

fn req(method: &str, uri: &str, user: Option<&str>, body: Option<Json>) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(u) = user {
        b = b.header(api::HEADER_USER_ID, u);
    }
    match body {
        Some(v) => b
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .expect("build request"),
        None => b.body(Body::empty()).expect("build request"),
    }
}

async fn send(app: &Router, r: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(r).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn health_is_public() {
    let app = api::router(test_state());
    let resp = app
        .oneshot(req("GET", "/health", None, None))
        .await
        .expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn missing_identity_is_401_with_sign_in_url() {
    let app = api::router(test_state());
    let (status, v) = send(&app, req("GET", "/competitors", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(v["code"], "UNAUTHORIZED");
    assert_eq!(v["sign_in_url"], "https://auth.example/sign-in");
}

#[tokio::test]
async fn competitor_crud_and_free_limit() {
    let app = api::router(test_state());
    let sites = ["payflow.tech", "creditflow.com", "moneybridge.io"];
    let mut ids = Vec::new();
    for s in sites {
        let (status, v) = send(
            &app,
            req("POST", "/competitors", Some("u1"), Some(json!({ "website": s }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "add {s}: {v}");
        ids.push(v["id"].as_str().unwrap().to_string());
    }

    let (status, v) = send(
        &app,
        req(
            "POST",
            "/competitors",
            Some("u1"),
            Some(json!({ "website": "instantpay.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(v["error"], "Free users can only add up to 3 competitors.");
    assert_eq!(v["code"], "PLAN_LIMIT");

    let (status, v) = send(&app, req("GET", "/competitors", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], 3);
    assert_eq!(v["limit"], 3);

    let (status, v) = send(
        &app,
        req(
            "PATCH",
            &format!("/competitors/{}", ids[0]),
            Some("u1"),
            Some(json!({ "industry": "FinTech" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{v}");
    assert_eq!(v["industry"], "FinTech");

    let (status, _) = send(
        &app,
        req("DELETE", &format!("/competitors/{}", ids[0]), Some("u2"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        req("DELETE", &format!("/competitors/{}", ids[0]), Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, v) = send(&app, req("GET", "/competitors", Some("u1"), None)).await;
    assert_eq!(v["total"], 2);
}

#[tokio::test]
async fn events_endpoint_returns_sorted_log_and_types() {
    let app = api::router(test_state());
    let (_, c) = send(
        &app,
        req("POST", "/competitors", Some("u1"), Some(json!({ "website": "payflow.tech" }))),
    )
    .await;
    let id = c["id"].as_str().unwrap();

    let (status, v) = send(
        &app,
        req("GET", &format!("/competitors/{id}/events?type=all"), Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["events"], json!([]));
    assert_eq!(v["types"], json!([]));
}

#[tokio::test]
async fn preview_endpoint() {
    let app = api::router(test_state());
    let (status, v) = send(
        &app,
        req("GET", "/competitors/preview?website=https://www.payflow.tech", Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["name"], "Payflow");
    assert_eq!(v["logo"], "https://logo.clearbit.com/payflow.tech");
    assert!(v.get("error").is_none());
}

#[tokio::test]
async fn alerts_filter_and_read_state() {
    let app = api::router(test_state());
    let (status, v) = send(
        &app,
        req("GET", "/alerts?type=funding,regulation&priority=high", Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = v["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "8"]);
    assert_eq!(v["unread"], 2);

    let (status, _) = send(&app, req("POST", "/alerts/1/read", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, req("POST", "/alerts/999/read", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, v) = send(&app, req("GET", "/alerts", Some("u1"), None)).await;
    assert_eq!(v["unread"], 9);
    assert_eq!(v["alerts"][0]["read"], true);

    // Read state is per user.
    let (_, v) = send(&app, req("GET", "/alerts", Some("u2"), None)).await;
    assert_eq!(v["unread"], 10);

    let (_, v) = send(&app, req("POST", "/alerts/read-all?type=market", Some("u1"), None)).await;
    assert_eq!(v["unread"], 0);
    let (_, v) = send(&app, req("GET", "/dashboard", Some("u1"), None)).await;
    assert_eq!(v["unread_alerts"], 7);
    assert_eq!(v["high_priority_alerts"], 2);

    let (status, v) = send(&app, req("GET", "/alerts?priority=urgent", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn trends_default_keywords_and_range() {
    let app = api::router(test_state());
    let (status, v) = send(&app, req("GET", "/trends?range=7d", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["keyword"], "fintech");
    assert_eq!(arr[0]["points"].as_array().unwrap().len(), 7);

    let (status, _) = send(&app, req("GET", "/trends?range=1y", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn news_without_api_key_is_unavailable() {
    let app = api::router(test_state());
    let (status, v) = send(&app, req("GET", "/trends/news?industry=Fintech", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["error"], "News API key not found");
}

#[tokio::test]
async fn reports_require_a_selection() {
    let app = api::router(test_state());
    let (status, v) = send(
        &app,
        req(
            "POST",
            "/reports",
            Some("u1"),
            Some(json!({ "competitors": [], "time_range": "30d", "type": "funding" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "Please select at least one competitor");

    let (_, c) = send(
        &app,
        req("POST", "/competitors", Some("u1"), Some(json!({ "website": "payflow.tech" }))),
    )
    .await;
    let (status, r) = send(
        &app,
        req(
            "POST",
            "/reports",
            Some("u1"),
            Some(json!({ "competitors": [c["id"]], "type": "competitive" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{r}");
    assert_eq!(r["type"], "competitive");

    let (_, list) = send(&app, req("GET", "/reports", Some("u1"), None)).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0]["id"], r["id"]);
    assert!(list[1].get("dateGenerated").is_some());
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let app = api::router(test_state());
    let resp = app
        .oneshot(req("GET", "/metrics", None, None))
        .await
        .expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn handler_panic_becomes_json_500() {
    let app = api::with_middleware(
        api::routes(test_state()).route("/boom", get(|| async { panic!("boom") as () })),
    );
    let (status, v) = send(&app, req("GET", "/boom", None, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["code"], "INTERNAL_ERROR");
}

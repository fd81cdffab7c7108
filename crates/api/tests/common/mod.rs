use std::sync::Arc;

use attendance_core::clock::ManualClock;
use attendance_core::config::EngineConfig;
use attendance_core::engine::AttendanceEngine;
use attendance_core::types::Timestamp;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use attendance_api::config::ServerConfig;
use attendance_api::router::build_app_router;
use attendance_api::state::AppState;

pub const TEACHER: i64 = 10;
pub const REVIEWER: i64 = 900;

/// Build a test `ServerConfig` with safe defaults and a 10/5 minute window
/// in UTC.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        sweep_interval_secs: 60,
        retention_days: None,
        engine: EngineConfig::default(),
    }
}

/// 2024-09-02 at the given UTC time.
pub fn at(hh: u32, mm: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 9, 2, hh, mm, 0).unwrap()
}

/// Build the production router over an engine driven by `clock`.
pub fn build_test_app(clock: Arc<ManualClock>) -> Router {
    let config = test_config();
    let engine = AttendanceEngine::new(config.engine.clone(), clock).unwrap();

    let state = AppState {
        engine: Arc::new(engine),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a one-hour lesson for [`TEACHER`] on 2024-09-02.
pub async fn register_lesson(app: &Router, id: i64, subject: &str, start: &str, end: &str) {
    let response = post_json(
        app.clone(),
        "/api/v1/occurrences",
        json!({
            "id": id,
            "teacher_id": TEACHER,
            "subject": subject,
            "room": "B-204",
            "date": "2024-09-02",
            "starts_at": start,
            "ends_at": end,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}

pub async fn check_in(app: &Router, occurrence_id: i64, kind: &str) -> Value {
    let response = post_json(
        app.clone(),
        "/api/v1/check-ins",
        json!({
            "occurrence_id": occurrence_id,
            "signal_kind": kind,
            "evidence": { "source": format!("{kind}-scanner-1") },
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"].clone()
}

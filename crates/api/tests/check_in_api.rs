//! HTTP-level tests for schedule ingestion, check-in and record reads.

mod common;

use std::sync::Arc;

use attendance_core::clock::ManualClock;
use axum::http::StatusCode;
use common::{at, body_json, check_in, get, post_json, register_lesson, TEACHER};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: registering an occurrence returns the pending record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_occurrence_returns_pending_record() {
    let clock = Arc::new(ManualClock::new(at(7, 0)));
    let app = common::build_test_app(clock);

    let response = post_json(
        app.clone(),
        "/api/v1/occurrences",
        json!({
            "id": 1,
            "teacher_id": TEACHER,
            "subject": "Physics",
            "room": "B-204",
            "date": "2024-09-02",
            "starts_at": "08:00:00",
            "ends_at": "09:00:00",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["window"]["opens_at"], "2024-09-02T07:50:00Z");
    assert_eq!(json["data"]["window"]["closes_at"], "2024-09-02T08:05:00Z");
    assert_eq!(json["data"]["window_status"], "too_early");
}

// ---------------------------------------------------------------------------
// Test: reusing an occurrence id for a different lesson is a conflict
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflicting_reregistration_returns_409() {
    let app = common::build_test_app(Arc::new(ManualClock::new(at(7, 0))));
    register_lesson(&app, 1, "Physics", "08:00:00", "09:00:00").await;
    // Identical payload is idempotent.
    register_lesson(&app, 1, "Physics", "08:00:00", "09:00:00").await;

    let response = post_json(
        app,
        "/api/v1/occurrences",
        json!({
            "id": 1,
            "teacher_id": TEACHER,
            "subject": "Chemistry",
            "room": "B-204",
            "date": "2024-09-02",
            "starts_at": "08:00:00",
            "ends_at": "09:00:00",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Test: QR at 07:52 accepted, biometric at 08:10 too late, verdict mismatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn late_second_signal_yields_mismatch() {
    let clock = Arc::new(ManualClock::new(at(7, 52)));
    let app = common::build_test_app(clock.clone());
    register_lesson(&app, 1, "Physics", "08:00:00", "09:00:00").await;

    let qr = check_in(&app, 1, "qr").await;
    assert_eq!(qr["accepted"], true);
    assert_eq!(qr["resulting_status"], "pending");

    clock.set(at(8, 10));
    let bio = check_in(&app, 1, "biometric").await;
    assert_eq!(bio["accepted"], false);
    assert_eq!(bio["reason"], "window_closed");
    assert_eq!(bio["closed_secs_ago"], 300);

    let response = get(app, "/api/v1/records/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await["data"].clone();
    assert_eq!(record["status"], "mismatch");
    assert_eq!(record["qr_confirmed"], true);
    assert_eq!(record["qr_confirmed_at"], "2024-09-02T07:52:00Z");
    assert_eq!(record["biometric_confirmed"], false);
}

// ---------------------------------------------------------------------------
// Test: both signals inside the window confirm before it closes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn both_signals_confirm_immediately() {
    let clock = Arc::new(ManualClock::new(at(7, 55)));
    let app = common::build_test_app(clock.clone());
    register_lesson(&app, 1, "Physics", "08:00:00", "09:00:00").await;

    check_in(&app, 1, "qr").await;
    clock.set(at(7, 57));
    let bio = check_in(&app, 1, "biometric").await;
    assert_eq!(bio["accepted"], true);
    assert_eq!(bio["resulting_status"], "confirmed");

    let record = body_json(get(app, "/api/v1/records/1").await).await;
    assert_eq!(record["data"]["status"], "confirmed");
    assert_eq!(record["data"]["window_status"], "open");
}

// ---------------------------------------------------------------------------
// Test: too early reports a countdown, duplicates report the first timestamp
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejections_explain_themselves() {
    let clock = Arc::new(ManualClock::new(at(7, 45)));
    let app = common::build_test_app(clock.clone());
    register_lesson(&app, 1, "Physics", "08:00:00", "09:00:00").await;

    let early = check_in(&app, 1, "qr").await;
    assert_eq!(early["accepted"], false);
    assert_eq!(early["reason"], "window_not_open");
    assert_eq!(early["opens_in_secs"], 300);

    clock.set(at(7, 51));
    assert_eq!(check_in(&app, 1, "qr").await["accepted"], true);

    clock.set(at(7, 53));
    let dup = check_in(&app, 1, "qr").await;
    assert_eq!(dup["accepted"], false);
    assert_eq!(dup["reason"], "already_confirmed");
    assert_eq!(dup["confirmed_at"], "2024-09-02T07:51:00Z");
}

// ---------------------------------------------------------------------------
// Test: unknown occurrence and malformed evidence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_occurrence_is_a_rejection_not_an_error() {
    let app = common::build_test_app(Arc::new(ManualClock::new(at(7, 55))));

    let result = check_in(&app, 404, "qr").await;
    assert_eq!(result["accepted"], false);
    assert_eq!(result["reason"], "unknown_occurrence");
}

#[tokio::test]
async fn empty_evidence_source_returns_400() {
    let app = common::build_test_app(Arc::new(ManualClock::new(at(7, 55))));
    register_lesson(&app, 1, "Physics", "08:00:00", "09:00:00").await;

    let response = post_json(
        app,
        "/api/v1/check-ins",
        json!({
            "occurrence_id": 1,
            "signal_kind": "qr",
            "evidence": { "source": "   " },
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: a date at the end of the calendar is rejected, not a crash
// ---------------------------------------------------------------------------

#[tokio::test]
async fn last_calendar_day_returns_400() {
    let app = common::build_test_app(Arc::new(ManualClock::new(at(7, 0))));

    let response = post_json(
        app.clone(),
        "/api/v1/occurrences",
        json!({
            "id": 1,
            "teacher_id": TEACHER,
            "subject": "Astronomy",
            "room": "Roof",
            "date": chrono::NaiveDate::MAX.to_string(),
            "starts_at": "23:58:00",
            "ends_at": "23:59:00",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // The server keeps serving.
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: GET on an unknown record is 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_record_returns_404() {
    let app = common::build_test_app(Arc::new(ManualClock::new(at(7, 55))));

    let response = get(app, "/api/v1/records/99").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

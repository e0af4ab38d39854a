//! Integration tests for `GET /cycles/expiration`.

mod common;

use axum::http::StatusCode;
use bokyak_core::local_time::LocalClock;
use chrono::Duration;
use common::{body_json, create_medication, get_auth, patient_with_token, post_json_auth, renew_for};
use serde_json::{json, Value};
use sqlx::PgPool;

const LEVOTHYROXINE: i64 = 320_001;

async fn expiration(pool: &PgPool, token: &str, query: &str) -> (StatusCode, Value) {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/cycles/expiration{query}"),
        token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expiration_reports_expiring_and_expired_cycles(pool: PgPool) {
    create_medication(&pool, LEVOTHYROXINE, "Levothyroxine 50mcg").await;
    let (_user, token) = patient_with_token(&pool, "thyroid").await;
    // A 7-day supply starting today.
    let outcome = renew_for(&pool, &token, LEVOTHYROXINE, 7.0).await;

    let (status, json) = expiration(&pool, &token, "").await;
    assert_eq!(status, StatusCode::OK);
    let report = &json["data"];
    assert_eq!(report["expiring_soon"].as_array().unwrap().len(), 1);
    assert_eq!(report["expiring_soon"][0]["days_remaining"], 7);
    assert_eq!(report["expiring_soon"][0]["cycle_id"], outcome["cycle_id"]);
    assert!(report["expired"].as_array().unwrap().is_empty());
    assert_eq!(report["needs_renewal"], false);

    let (_, json) = expiration(&pool, &token, "?warning_days=3").await;
    assert!(json["data"]["expiring_soon"].as_array().unwrap().is_empty());

    // An earlier cycle of the same group that was never closed.
    let today = LocalClock::default().today();
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/cycles",
        json!({
            "group_id": outcome["group_id"],
            "cycle_start": (today - Duration::days(30)).to_string(),
            "cycle_end": (today - Duration::days(2)).to_string(),
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, json) = expiration(&pool, &token, "").await;
    assert_eq!(status, StatusCode::OK);
    let report = &json["data"];
    assert_eq!(report["expired"].as_array().unwrap().len(), 1);
    assert_eq!(report["expired"][0]["days_overdue"], 2);
    assert_eq!(report["needs_renewal"], true);
    assert_eq!(
        json["message"],
        "Some prescriptions have run out and need renewal"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expiration_rejects_out_of_range_warning_days(pool: PgPool) {
    let (_user, token) = patient_with_token(&pool, "lookahead").await;

    for query in ["?warning_days=-1", "?warning_days=100000000"] {
        let (status, json) = expiration(&pool, &token, query).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    let (status, _) = expiration(&pool, &token, "?warning_days=366").await;
    assert_eq!(status, StatusCode::OK);
}

//! Tests for `AppError` → failure envelope mapping.
//!
//! The first half renders `AppError` values directly through `IntoResponse`;
//! the second half provokes database constraint violations over HTTP.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use bokyak_api::error::AppError;
use bokyak_core::error::CoreError;
use common::{body_json, create_test_user, login_for_token, patient_with_token, post_json_auth};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Envelope rendering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_errors_keep_their_message() {
    let cases = [
        (
            AppError::not_found("MedicationDetail", 42),
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "MedicationDetail with id 42 not found",
        ),
        (
            AppError::BadRequest("start_date must not be after end_date".into()),
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "start_date must not be after end_date",
        ),
        (
            AppError::validation("Invalid record type 'EATEN'"),
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Invalid record type 'EATEN'",
        ),
        (
            AppError::Core(CoreError::Conflict("Username 'kim' is already taken".into())),
            StatusCode::CONFLICT,
            "CONFLICT",
            "Username 'kim' is already taken",
        ),
        (
            AppError::Core(CoreError::Unauthorized("no token provided".into())),
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "no token provided",
        ),
        (
            AppError::Core(CoreError::Forbidden("insufficient permissions".into())),
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "insufficient permissions",
        ),
    ];

    for (err, status, code, message) in cases {
        let (rendered, json) = error_to_response(err).await;
        assert_eq!(rendered, status, "{message}");
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], code);
        assert_eq!(json["message"], message);
    }
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    for err in [
        AppError::InternalError("connection pool exhausted at 10.0.0.5".into()),
        AppError::Core(CoreError::Internal("sequence overflow in codes".into())),
    ] {
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["message"], "An internal error occurred");
    }
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn classify_matches_response() {
    let err = AppError::validation("quantity must not be negative");
    let (status, code, message) = err.classify();

    let (rendered_status, json) = error_to_response(err).await;

    assert_eq!(status, rendered_status);
    assert_eq!(json["code"], code);
    assert_eq!(json["message"], message);
}

// ---------------------------------------------------------------------------
// Constraint violations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_hospital_code_is_conflict(pool: PgPool) {
    let (_user, token) = patient_with_token(&pool, "twovisits").await;
    let hospital = json!({ "hosp_code": "H-777", "hosp_name": "Busan Clinic" });

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/hospitals",
        hospital.clone(),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response =
        post_json_auth(common::build_test_app(pool), "/api/v1/hospitals", hospital, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "A hospital with this code is already registered");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_item_seq_is_conflict(pool: PgPool) {
    create_test_user(&pool, "catalogue", "admin").await;
    let admin = login_for_token(&pool, "catalogue").await;
    let drug = json!({ "item_seq": 400_001, "item_name": "Losartan 50mg" });

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/medications",
        drug.clone(),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response =
        post_json_auth(common::build_test_app(pool), "/api/v1/medications", drug, &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["message"], "A medication with this item_seq already exists");
}

//! Integration tests for `/api-key` and `X-Api-Key` authentication.

mod common;

use axum::http::StatusCode;
use bokyak_core::api_keys::{KEY_LENGTH, KEY_PREFIX_LENGTH, MASK_SUFFIX};
use common::{body_json, get_auth, get_with_api_key, patient_with_token, post_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_show_without_key_is_empty(pool: PgPool) {
    let (_user, token) = patient_with_token(&pool, "nokey").await;
    let response = get_auth(common::build_test_app(pool), "/api/v1/api-key", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_issue_then_show_masked(pool: PgPool) {
    let (_user, token) = patient_with_token(&pool, "keyholder").await;

    let response = post_auth(common::build_test_app(pool.clone()), "/api/v1/api-key", &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let plaintext = json["data"]["apikey"].as_str().unwrap().to_string();
    assert_eq!(plaintext.len(), KEY_LENGTH);

    let response = get_auth(common::build_test_app(pool), "/api/v1/api-key", &token).await;
    let json = body_json(response).await;
    let masked = json["data"]["apikey"].as_str().unwrap();
    assert_eq!(
        masked,
        format!("{}{}", &plaintext[..KEY_PREFIX_LENGTH], MASK_SUFFIX)
    );
    assert!(json["data"]["expires"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_api_key_authenticates(pool: PgPool) {
    let (user, token) = patient_with_token(&pool, "keyauth").await;
    let response = post_auth(common::build_test_app(pool.clone()), "/api/v1/api-key", &token).await;
    let plaintext = body_json(response).await["data"]["apikey"]
        .as_str()
        .unwrap()
        .to_string();

    let response =
        get_with_api_key(common::build_test_app(pool.clone()), "/api/v1/users/me", &plaintext).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);

    let response = get_with_api_key(
        common::build_test_app(pool),
        "/api/v1/users/me",
        "not-a-real-key-not-a-real-key-not-a-real-key-xx",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Issuing a new key invalidates the previous one.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reissue_replaces_key(pool: PgPool) {
    let (_user, token) = patient_with_token(&pool, "rotator").await;
    let first = body_json(
        post_auth(common::build_test_app(pool.clone()), "/api/v1/api-key", &token).await,
    )
    .await["data"]["apikey"]
        .as_str()
        .unwrap()
        .to_string();
    let second = body_json(
        post_auth(common::build_test_app(pool.clone()), "/api/v1/api-key", &token).await,
    )
    .await["data"]["apikey"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    let response =
        get_with_api_key(common::build_test_app(pool.clone()), "/api/v1/users/me", &first).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response =
        get_with_api_key(common::build_test_app(pool), "/api/v1/users/me", &second).await;
    assert_eq!(response.status(), StatusCode::OK);
}

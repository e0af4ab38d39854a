//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bokyak_api::app::build_app;
use bokyak_api::auth::jwt::JwtConfig;
use bokyak_api::auth::password::hash_password;
use bokyak_api::config::ServerConfig;
use bokyak_api::notifications::PushNotifier;
use bokyak_api::state::AppState;
use bokyak_core::api_keys::API_KEY_HEADER;
use bokyak_core::local_time::LocalClock;
use bokyak_db::models::medication::CreateMedication;
use bokyak_db::models::user::{CreateUser, User};
use bokyak_db::repositories::{MedicationRepo, UserRepo};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        local_utc_offset_hours: 9,
        reminder_interval_secs: 60,
        refill_check_interval_secs: 86_400,
        push_gateway_url: None,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// The production router over `pool`, with the KST clock and log-only push.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        clock: LocalClock::default(),
        push: Arc::new(PushNotifier::new(None)),
        config: Arc::new(test_config()),
    };
    build_app(state).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

/// GET with an `X-Api-Key` header instead of a bearer token.
pub async fn get_with_api_key(app: Router, uri: &str, key: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(API_KEY_HEADER, key)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::POST, uri, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user directly in the database with [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, username: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            display_name: username.to_string(),
            password_hash,
            role: role.to_string(),
            push_agree: true,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login_for_token(pool: &PgPool, username: &str) -> String {
    let body = json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["data"]["access_token"].as_str().unwrap().to_string()
}

/// Create a patient and return `(user, access_token)`.
pub async fn patient_with_token(pool: &PgPool, username: &str) -> (User, String) {
    let user = create_test_user(pool, username, "patient").await;
    let token = login_for_token(pool, username).await;
    (user, token)
}

/// Insert a drug into the reference table.
pub async fn create_medication(pool: &PgPool, item_seq: i64, name: &str) {
    MedicationRepo::create(
        pool,
        &CreateMedication {
            item_seq,
            item_name: name.to_string(),
            entp_name: Some("Test Pharma".to_string()),
            item_image: None,
            class_name: None,
            dosage_form: Some("tablet".to_string()),
            is_prescription: Some(true),
        },
    )
    .await
    .expect("medication creation should succeed");
}

/// Morning and evening one tablet each, `prn` disabled.
pub fn twice_daily() -> serde_json::Value {
    json!({
        "morning": {"enabled": true, "quantity": 1, "unit": "tablet"},
        "evening": {"enabled": true, "quantity": 1, "unit": "tablet"},
        "prn": {"enabled": false}
    })
}

/// Create a hospital and an illness through the API and return their ids.
pub async fn hospital_and_illness(pool: &PgPool, token: &str) -> (i64, i64) {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/hospitals",
        json!({ "hosp_code": "H-001", "hosp_name": "Seoul Clinic" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let hospital_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/illnesses",
        json!({ "ill_name": "Hypertension", "is_chronic": true }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let illness_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    (hospital_id, illness_id)
}

/// Renew a prescription for `item_seq` starting today (KST) and return the
/// renewal outcome (`prescription_id`, `group_id`, `cycle_id`, `detail_ids`, ...).
pub async fn renew_for(
    pool: &PgPool,
    token: &str,
    item_seq: i64,
    total_quantity: f64,
) -> serde_json::Value {
    let (hospital_id, illness_id) = hospital_and_illness(pool, token).await;
    let today = LocalClock::default().today();
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/prescriptions/renew",
        json!({
            "hospital_id": hospital_id,
            "illness_id": illness_id,
            "prescription_date": today.to_string(),
            "medications": [{
                "medication_id": item_seq,
                "dosage_pattern": twice_daily(),
                "duration_days": 7,
                "total_quantity": total_quantity,
            }],
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

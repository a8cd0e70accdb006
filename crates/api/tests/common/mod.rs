//! Shared helpers for API integration tests.
//!
//! Builds the full production router (same middleware stack as `main.rs`)
//! against the per-test database pool, with a fake Mux provider so no test
//! ever talks to the real API.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use sha2::Sha256;
use sqlx::PgPool;
use tower::ServiceExt;

use riffline_api::auth::jwt::JwtConfig;
use riffline_api::auth::password::hash_password;
use riffline_api::config::ServerConfig;
use riffline_api::router::build_app_router;
use riffline_api::state::AppState;
use riffline_db::models::user::CreateUser;
use riffline_db::repositories::UserRepo;
use riffline_mux::provider::{
    AssetDetail, DirectUpload, PlaybackId, ProviderError, UploadDetail, VideoProvider,
};

/// Webhook signing secret wired into the test app.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        frontend_url: "http://localhost:5173".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-do-not-use".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

// ---------------------------------------------------------------------------
// Fake Mux provider
// ---------------------------------------------------------------------------

/// In-memory provider double. Records every call so tests can assert the
/// provider was (or was not) contacted.
#[derive(Default)]
pub struct FakeProvider {
    /// Asset id the fake reports as attached to any upload.
    pub upload_asset_id: Option<String>,
    /// Asset detail returned by `get_asset`.
    pub asset: Option<AssetDetail>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    /// A provider whose asset is already processed and playable.
    pub fn with_ready_asset(asset_id: &str, playback_id: &str, duration: f64) -> Self {
        FakeProvider {
            upload_asset_id: Some(asset_id.to_string()),
            asset: Some(AssetDetail {
                id: asset_id.to_string(),
                status: "ready".to_string(),
                duration: Some(duration),
                playback_ids: vec![PlaybackId {
                    id: playback_id.to_string(),
                    policy: Some("public".to_string()),
                }],
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    async fn create_direct_upload(
        &self,
        _cors_origin: &str,
    ) -> Result<DirectUpload, ProviderError> {
        self.record("create_direct_upload");
        Ok(DirectUpload {
            id: "up_123".to_string(),
            url: "https://storage.example.com/upload/up_123".to_string(),
            status: "waiting".to_string(),
            asset_id: None,
        })
    }

    async fn get_upload(&self, upload_id: &str) -> Result<UploadDetail, ProviderError> {
        self.record("get_upload");
        Ok(UploadDetail {
            id: upload_id.to_string(),
            status: "asset_created".to_string(),
            asset_id: self.upload_asset_id.clone(),
        })
    }

    async fn get_asset(&self, asset_id: &str) -> Result<AssetDetail, ProviderError> {
        self.record("get_asset");
        match &self.asset {
            Some(asset) if asset.id == asset_id => Ok(asset.clone()),
            _ => Err(ProviderError::Api {
                status: 404,
                body: format!("asset {asset_id} not found"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router with a default fake provider
/// (`asset_123` / `pb_789`, 142 seconds, ready).
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(
        pool,
        Arc::new(FakeProvider::with_ready_asset("asset_123", "pb_789", 142.0)),
    )
}

/// Build the application router around a specific provider double.
pub fn build_test_app_with(pool: PgPool, provider: Arc<dyn VideoProvider>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        provider: Some(provider),
        webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
    };
    build_app_router(state, &config)
}

/// Build the application router with NO provider configured.
pub fn build_test_app_without_provider(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        provider: None,
        webhook_secret: None,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Auth / seed helpers
// ---------------------------------------------------------------------------

/// Register a user through the API and return their access token.
pub async fn register_user(app: &Router, email: &str, role: &str) -> String {
    let (token, _) = register_user_with_id(app, email, role).await;
    token
}

/// Register a user through the API and return `(token, user_id)`.
pub async fn register_user_with_id(app: &Router, email: &str, role: &str) -> (String, i64) {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "email": email,
            "password": "correct-horse-battery",
            "first_name": "Test",
            "last_name": "User",
            "role": role,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration failed");

    let json = body_json(response).await;
    let token = json["token"].as_str().expect("token in response").to_string();
    let user_id = json["user"]["id"].as_i64().expect("user id in response");
    (token, user_id)
}

/// Admin accounts cannot be self-registered, so seed one directly in the
/// database and log in through the API. Returns `(token, user_id)`.
pub async fn seed_admin(app: &Router, pool: &PgPool) -> (String, i64) {
    let password = "correct-horse-battery";
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: "admin@riffline.test".to_string(),
            password_hash: hash_password(password).expect("hash admin password"),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
            role: "admin".to_string(),
        },
    )
    .await
    .expect("insert admin");

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "admin@riffline.test", "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "admin login failed");

    let json = body_json(response).await;
    let token = json["token"].as_str().expect("token in response").to_string();
    (token, user.id)
}

/// Register an instructor and create a course they own. Returns
/// `(instructor_token, course_id)`.
pub async fn seed_instructor_with_course(app: &Router) -> (String, i64) {
    let token = register_user(app, "teacher@riffline.test", "instructor").await;
    let response = post_json_auth(
        app,
        "/api/v1/courses",
        &token,
        serde_json::json!({
            "title": "Blues Guitar Foundations",
            "description": "Twelve-bar blues from scratch",
            "category": "guitar",
            "level": "beginner",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "course creation failed");

    let json = body_json(response).await;
    let course_id = json["data"]["id"].as_i64().expect("course id");
    (token, course_id)
}

// ---------------------------------------------------------------------------
// Webhook signing
// ---------------------------------------------------------------------------

/// Build a valid `t=...,v1=...` Mux signature header for the given body,
/// timestamped now.
pub fn sign_webhook(body: &[u8]) -> String {
    sign_webhook_with(body, TEST_WEBHOOK_SECRET, chrono::Utc::now().timestamp())
}

/// Signature header with an explicit secret and timestamp.
pub fn sign_webhook_with(body: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    let sig = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={sig}")
}

/// POST a raw webhook body with the given signature header.
pub async fn post_webhook(app: &Router, body: &[u8], signature: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/videos/webhook")
        .header("content-type", "application/json")
        .header("mux-signature", signature)
        .body(Body::from(body.to_vec()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

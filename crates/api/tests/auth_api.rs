//! Integration tests for `/api/v1/auth` (register, login, me).

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, register_user};
use serde_json::json;
use sqlx::PgPool;

fn register_body(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "correct-horse-battery",
        "first_name": "Riley",
        "last_name": "Fretboard",
    })
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_student_and_returns_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("riley@riffline.test"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["email"], "riley@riffline.test");
    assert_eq!(json["user"]["role"], "student");
    assert_eq!(json["user"]["subscription_status"], "none");
    // The password hash must never leave the server.
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_duplicate_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let first = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("dupe@riffline.test"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("dupe@riffline.test"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let json = body_json(second).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_weak_password_and_bad_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut body = register_body("weak@riffline.test");
    body["password"] = json!("short");
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = register_body("not-an-email");
    body["email"] = json!("not-an-email");
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_refuses_admin_role(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut body = register_body("sneaky@riffline.test");
    body["role"] = json!("admin");
    let response = post_json(&app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_token_for_valid_credentials(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(&app, "login@riffline.test", "student").await;

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({
            "email": "login@riffline.test",
            "password": "correct-horse-battery",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["email"], "login@riffline.test");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_rejects_wrong_password_and_unknown_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(&app, "victim@riffline.test", "student").await;

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({
            "email": "victim@riffline.test",
            "password": "wrong-password-entirely",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({
            "email": "nobody@riffline.test",
            "password": "correct-horse-battery",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Me
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_returns_profile_for_authenticated_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_user(&app, "me@riffline.test", "instructor").await;

    let response = get_auth(&app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "me@riffline.test");
    assert_eq!(json["data"]["role"], "instructor");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_rejects_missing_and_malformed_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(&app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(&app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

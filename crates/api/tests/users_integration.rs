//! Integration tests for managed user endpoints against the stub media server.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    cleanup_all_test_data, create_test_app, create_test_pool, delete_request_with_auth,
    get_request_with_auth, json_request_with_auth, login, parse_response_body, run_migrations,
    seed_admin, test_config, StubJellyfin,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

/// Link an upstream user to a local account row, optionally already expired.
async fn link_account(pool: &PgPool, username: &str, jellyfin_user_id: &str, expired: bool) {
    let password_hash = shared::password::hash_password("linked-pw").unwrap();
    let interval = if expired { "-1 hour" } else { "1 hour" };
    sqlx::query(&format!(
        r#"
        INSERT INTO app_users (username, password_hash, jellyfin_user_id, expires_at)
        VALUES ($1, $2, $3, NOW() + INTERVAL '{}')
        "#,
        interval
    ))
    .bind(username)
    .bind(&password_hash)
    .bind(jellyfin_user_id)
    .execute(pool)
    .await
    .expect("Failed to link account");
}

#[tokio::test]
async fn test_list_users_merges_upstream_and_local_state() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-plain", "plainuser");
    stub.seed_user("u-linked", "linkeduser");
    link_account(&pool, "linkeduser", "u-linked", false).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(get_request_with_auth("/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    let plain = data.iter().find(|u| u["id"] == "u-plain").unwrap();
    assert_eq!(plain["status"], "permanent");
    assert!(plain["expires_at"].is_null());

    let linked = data.iter().find(|u| u["id"] == "u-linked").unwrap();
    assert_eq!(linked["status"], "active");
    assert!(linked["expires_at"].is_string());
    assert!(linked["remaining_minutes"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_list_users_disables_expired_account_lazily() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-expired", "expireduser");
    link_account(&pool, "expireduser", "u-expired", true).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(get_request_with_auth("/api/users", &token))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let user = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == "u-expired")
        .unwrap();
    assert_eq!(user["status"], "disabled");
    assert_eq!(user["is_disabled"], true);

    // The disable propagated upstream and into the local row.
    let policy = stub.user_policy("u-expired").unwrap();
    assert_eq!(policy["IsDisabled"], true);
    let disabled: bool =
        sqlx::query_scalar("SELECT is_disabled FROM app_users WHERE username = 'expireduser'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(disabled);
}

#[tokio::test]
async fn test_expired_account_disabled_upstream_exactly_once() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-once", "onceuser");
    link_account(&pool, "onceuser", "u-once", true).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    // First observation performs the disable.
    let response = app
        .clone()
        .oneshot(get_request_with_auth("/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stub.policy_call_count("u-once"), 1);

    // Second observation sees the already-disabled row and makes no
    // further upstream policy call.
    let response = app
        .oneshot(get_request_with_auth("/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let user = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == "u-once")
        .unwrap();
    assert_eq!(user["status"], "disabled");
    assert_eq!(stub.policy_call_count("u-once"), 1);
}

#[tokio::test]
async fn test_create_user_applies_role_policy() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/users",
            json!({
                "username": "curator",
                "password": "curator-pw",
                "role": "ContentManager"
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["name"], "curator");
    assert_eq!(body["role"], "ContentManager");
    let id = body["id"].as_str().unwrap().to_string();

    let policy = stub.user_policy(&id).unwrap();
    assert_eq!(policy["IsAdministrator"], false);
    assert_eq!(policy["EnableContentDeletion"], true);
}

#[tokio::test]
async fn test_update_user_disable_propagates() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-target", "targetuser");
    link_account(&pool, "targetuser", "u-target", false).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            "/api/users/u-target",
            json!({ "is_disabled": true }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["is_disabled"], true);
    assert_eq!(body["status"], "disabled");

    let policy = stub.user_policy("u-target").unwrap();
    assert_eq!(policy["IsDisabled"], true);
    let disabled: bool =
        sqlx::query_scalar("SELECT is_disabled FROM app_users WHERE username = 'targetuser'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(disabled);

    // Empty update body is rejected.
    let response = app
        .oneshot(json_request_with_auth(
            Method::PUT,
            "/api/users/u-target",
            json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_password_syncs_local_hash() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-pw", "pwuser");
    link_account(&pool, "pwuser", "u-pw", false).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            "/api/users/u-pw",
            json!({ "password": "fresh-pw!" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The linked account logs in with the new password.
    let member_token = login(&app, "pwuser", "fresh-pw!").await;
    assert!(!member_token.is_empty());
}

#[tokio::test]
async fn test_delete_user_removes_upstream_and_local() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-gone", "goneuser");
    link_account(&pool, "goneuser", "u-gone", false).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(delete_request_with_auth("/api/users/u-gone", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(stub.user_count(), 0);
    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM app_users WHERE username = 'goneuser'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);

    // A second delete reports the user as missing.
    let response = app
        .oneshot(delete_request_with_auth("/api/users/u-gone", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_unavailable_without_connection() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(get_request_with_auth("/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_watch_history_respects_toggle() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let stub = StubJellyfin::spawn().await;
    stub.connect(&pool).await;
    stub.seed_user("u-viewer", "viewer");

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(get_request_with_auth("/api/users/u-viewer/history", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            "/api/system/settings",
            json!({ "watch_history_enabled": false }),
            &token,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request_with_auth("/api/users/u-viewer/history", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

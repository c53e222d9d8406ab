//! Integration tests for profile and role management.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    cleanup_all_test_data, create_test_app, create_test_pool, delete_request_with_auth,
    get_request_with_auth, json_request_with_auth, login, parse_response_body, run_migrations,
    seed_admin, test_config,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn default_count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE is_default = true",
        table
    ))
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_profile_crud() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/user-profiles",
            json!({
                "name": "Kids",
                "enabled_folders": ["cartoons", "family"],
                "home_layout": { "OrderedViews": ["cartoons"] }
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["enabled_folders"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            &format!("/api/user-profiles/{}", id),
            json!({ "name": "Children" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["name"], "Children");
    // Untouched fields survive the partial update.
    assert_eq!(updated["enabled_folders"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/user-profiles/{}", id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get_request_with_auth("/api/user-profiles", &token))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_single_default_profile_invariant() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let mut ids = Vec::new();
    for name in ["First", "Second"] {
        let response = app
            .clone()
            .oneshot(json_request_with_auth(
                Method::POST,
                "/api/user-profiles",
                json!({ "name": name, "is_default": true }),
                &token,
            ))
            .await
            .unwrap();
        let body = parse_response_body(response).await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    // The second default displaced the first; never two at once.
    assert_eq!(default_count(&pool, "user_profiles").await, 1);

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/user-profiles/{}/default", ids[0]),
            json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["is_default"], true);
    assert_eq!(default_count(&pool, "user_profiles").await, 1);

    // Defaulting a missing profile changes nothing.
    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/user-profiles/{}/default", uuid::Uuid::new_v4()),
            json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(default_count(&pool, "user_profiles").await, 1);
}

#[tokio::test]
async fn test_profile_delete_guarded_by_active_invites() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/user-profiles",
            json!({ "name": "Guarded" }),
            &token,
        ))
        .await
        .unwrap();
    let profile = parse_response_body(response).await;
    let profile_id = profile["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/invites",
            json!({ "profile_id": profile_id }),
            &token,
        ))
        .await
        .unwrap();
    let invite = parse_response_body(response).await;
    let invite_id = invite["id"].as_str().unwrap().to_string();

    // Refused while the invite is active.
    let response = app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/user-profiles/{}", profile_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Allowed once the invite is revoked.
    app.clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/invites/{}", invite_id),
            &token,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(delete_request_with_auth(
            &format!("/api/user-profiles/{}", profile_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_role_crud_and_duplicate_name() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/user-roles",
            json!({ "name": "Moderator", "description": "Can review" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["is_admin"], false);

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/user-roles",
            json!({ "name": "Moderator" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            &format!("/api/user-roles/{}", id),
            json!({ "is_admin": true }),
            &token,
        ))
        .await
        .unwrap();
    let updated = parse_response_body(response).await;
    assert_eq!(updated["is_admin"], true);

    let response = app
        .oneshot(delete_request_with_auth(
            &format!("/api/user-roles/{}", id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_role_delete_guarded_by_accounts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    // The admin account holds its seeded role.
    let role_id: uuid::Uuid =
        sqlx::query_scalar("SELECT role_id FROM app_users WHERE id = $1")
            .bind(admin.id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let response = app
        .oneshot(delete_request_with_auth(
            &format!("/api/user-roles/{}", role_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_single_default_role_invariant() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    // Seeded 'User' role is the default; promote a new one.
    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/user-roles",
            json!({ "name": "Trial", "is_default": true }),
            &token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["is_default"], true);

    assert_eq!(default_count(&pool, "user_roles").await, 1);
    let default_name: String =
        sqlx::query_scalar("SELECT name FROM user_roles WHERE is_default = true")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(default_name, "Trial");
}

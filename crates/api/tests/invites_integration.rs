//! Integration tests for invite management endpoints.
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
use tower::ServiceExt;

#[tokio::test]
async fn test_create_invite_with_default_expiry() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/invites",
            json!({ "label": "friends", "max_uses": 5 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(body["label"], "friends");
    assert_eq!(body["max_uses"], 5);
    assert_eq!(body["used_count"], 0);
    assert_eq!(body["redeemable"], true);
    // The configured default lifetime kicks in when expiry is omitted.
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_create_invite_with_user_expiry() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/invites",
            json!({
                "user_expiry": { "enabled": true, "days": 2, "hours": 3 }
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["user_expiry_minutes"], 2 * 24 * 60 + 3 * 60);
}

#[tokio::test]
async fn test_create_invite_validation() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/invites",
            json!({ "max_uses": 0 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_invite_unknown_profile() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/invites",
            json!({ "profile_id": uuid::Uuid::new_v4() }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_update_and_revoke_invite() {
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
            "/api/invites",
            json!({ "label": "old" }),
            &token,
        ))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Listed while active.
    let response = app
        .clone()
        .oneshot(get_request_with_auth("/api/invites", &token))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Update keeps untouched fields.
    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            &format!("/api/invites/{}", id),
            json!({ "label": "new" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["label"], "new");
    assert_eq!(body["code"], created["code"]);

    // Revoke soft-deletes.
    let response = app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/invites/{}", id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get_request_with_auth("/api/invites", &token))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Revoking again is a 404.
    let response = app
        .oneshot(delete_request_with_auth(
            &format!("/api/invites/{}", id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_invite_max_uses_cannot_drop_below_spent() {
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
            "/api/invites",
            json!({ "label": "party", "max_uses": 5 }),
            &token,
        ))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Two uses already redeemed.
    sqlx::query("UPDATE invites SET used_count = 2 WHERE id = $1::uuid")
        .bind(&id)
        .execute(&pool)
        .await
        .unwrap();

    // The budget cannot shrink below what is spent.
    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            &format!("/api/invites/{}", id),
            json!({ "max_uses": 1 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Matching the spent count is the lowest accepted value.
    let response = app
        .oneshot(json_request_with_auth(
            Method::PUT,
            &format!("/api/invites/{}", id),
            json!({ "max_uses": 2 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["max_uses"], 2);
    assert_eq!(body["used_count"], 2);
}

#[tokio::test]
async fn test_public_invite_info() {
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
            "/api/invites",
            json!({ "user_label": "Friends of the house" }),
            &token,
        ))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let code = created["code"].as_str().unwrap().to_string();

    // No authentication needed.
    let request = axum::http::Request::builder()
        .method(Method::GET)
        .uri(format!("/api/invites/{}/info", code))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["code"], code.as_str());
    assert_eq!(body["user_label"], "Friends of the house");
    assert_eq!(body["redeemable"], true);
    // The preview must not expose internals.
    assert!(body.get("used_count").is_none());
    assert!(body.get("created_by").is_none());
}

#[tokio::test]
async fn test_public_invite_info_unknown_and_revoked_look_alike() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let admin = seed_admin(&pool).await;
    let token = login(&app, &admin.username, &admin.password).await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(Method::POST, "/api/invites", json!({}), &token))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    let code = created["code"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/invites/{}", id),
            &token,
        ))
        .await
        .unwrap();

    for probe in [code.as_str(), "ZZZZZZ"] {
        let request = axum::http::Request::builder()
            .method(Method::GET)
            .uri(format!("/api/invites/{}/info", probe))
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = parse_response_body(response).await;
        assert_eq!(body["error"], "invite_not_found");
    }
}

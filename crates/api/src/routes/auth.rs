//! Dashboard login, logout, and session introspection.

use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use tracing::info;
use validator::Validate;

use domain::models::app_user::{AppUser, LoginRequest, LoginResponse};
use domain::services::expiry::{account_status, AccountStatus};
use persistence::repositories::{AppUserRepository, SessionRepository};
use shared::crypto::{generate_session_token, sha256_hex};
use shared::password::verify_password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// POST /api/auth/login
///
/// Verifies credentials and issues an opaque bearer token. Every failure,
/// including disabled and expired accounts, gets the same 401 body so the
/// response never reveals account state.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let users = AppUserRepository::new(state.pool.clone());
    let account = users.find_by_username(&request.username).await?;

    let account = match account {
        Some(account) => account,
        None => {
            // Burn comparable time so missing accounts are not
            // distinguishable by response latency.
            let _ = verify_password(&request.password, DUMMY_HASH);
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
    };

    let valid = verify_password(&request.password, &account.password_hash)
        .map_err(|e| ApiError::Internal(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let status = account_status(account.expires_at, account.is_disabled, Utc::now());
    if matches!(status, AccountStatus::Disabled | AccountStatus::Expired) {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = generate_session_token();
    let expires_at = Utc::now() + Duration::hours(state.config.auth.session_ttl_hours);
    let sessions = SessionRepository::new(state.pool.clone());
    sessions
        .create_session(account.id, &sha256_hex(&token), expires_at)
        .await?;

    info!(username = %account.username, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_at,
        user: AppUser::from(account),
    }))
}

/// POST /api/auth/logout
///
/// Deletes the presented session. Idempotent.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sessions = SessionRepository::new(state.pool.clone());
    sessions.delete_by_token_hash(&current.token_hash).await?;
    info!(username = %current.username, "User logged out");
    Ok(Json(serde_json::json!({ "status": "logged_out" })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<AppUser>, ApiError> {
    let users = AppUserRepository::new(state.pool.clone());
    let account = users
        .find_by_id(current.app_user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    Ok(Json(AppUser::from(account)))
}

// Argon2id hash of a throwaway string, used only for timing equalization.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$L5bUdiQ122j+X2zyPsmrzSmBJI1rZrzRK15vyoties0";

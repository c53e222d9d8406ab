//! Session authentication middleware.
//!
//! Bearer tokens are opaque; only their sha256 hash is stored. Lookup joins
//! the session with its account and role so handlers get everything in one
//! extension.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use persistence::repositories::SessionRepository;
use shared::crypto::sha256_hex;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated session info stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: Uuid,
    pub app_user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    /// Hash of the presented token, needed by logout.
    pub token_hash: String,
}

// Takes the header map rather than the whole request: `Body` is not `Sync`,
// so holding `&Request<Body>` across the lookup await would make the
// middleware futures non-`Send`.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, ApiError> {
    let auth_header = headers.get("Authorization").and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return Err(ApiError::Unauthorized(
                "Missing or invalid Authorization header".into(),
            ))
        }
    };

    let token_hash = sha256_hex(token);
    let sessions = SessionRepository::new(state.pool.clone());
    let session = sessions
        .find_valid(&token_hash, Utc::now())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".into()))?;

    if session.is_disabled {
        return Err(ApiError::Unauthorized("Account is disabled".into()));
    }

    Ok(CurrentUser {
        session_id: session.session_id,
        app_user_id: session.app_user_id,
        username: session.username,
        is_admin: session.is_admin,
        token_hash,
    })
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware that requires a valid session linked to an admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(user) if user.is_admin => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(_) => ApiError::Forbidden("Admin access required".into()).into_response(),
        Err(e) => e.into_response(),
    }
}

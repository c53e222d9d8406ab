//! Managed Jellyfin user endpoints.
//!
//! Reads go straight to the upstream server; the local database only
//! contributes expiry bookkeeping for invite-provisioned accounts.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use domain::models::activity::{ActivityType, NewActivity};
use domain::models::jellyfin::ItemsResult;
use domain::models::user::{CreateUserRequest, ListUsersResponse, UpdateUserRequest, UserResponse};
use domain::services::expiry::account_status;
use domain::services::roles::RoleLabel;
use persistence::entities::AppUserEntity;
use persistence::repositories::{
    ActivityLogRepository, AppUserRepository, SessionRepository, SettingsRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::connection::connected_client;
use crate::services::expiry::enforce_expiry;
use crate::services::jellyfin::{JellyfinClient, JellyfinError};

/// GET /api/users
///
/// Lists upstream users merged with local expiry state. Expired accounts
/// spotted here are disabled on the spot rather than waiting for the sweep.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ListUsersResponse>, ApiError> {
    let client = connected_client(&state.pool, &state.http).await?;
    let upstream = client.list_users().await?;

    let app_users = AppUserRepository::new(state.pool.clone());
    let linked: HashMap<String, AppUserEntity> = app_users
        .list_linked()
        .await?
        .into_iter()
        .filter_map(|e| e.jellyfin_user_id.clone().map(|id| (id, e)))
        .collect();

    let now = Utc::now();
    let mut data = Vec::with_capacity(upstream.len());
    for mut user in upstream {
        if let Some(account) = linked.get(&user.id) {
            match enforce_expiry(&state.pool, &client, account).await {
                Ok(true) => user.policy.is_disabled = true,
                Ok(false) => {}
                Err(e) => warn!(
                    username = %account.username,
                    error = %e,
                    "Lazy expiry enforcement failed"
                ),
            }
        }
        let expires_at = linked.get(&user.id).and_then(|a| a.expires_at);
        let status = account_status(expires_at, user.policy.is_disabled, now);
        data.push(UserResponse::from_parts(user, expires_at, status));
    }

    Ok(Json(ListUsersResponse { data }))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let client = connected_client(&state.pool, &state.http).await?;
    let mut user = fetch_user(&client, &id).await?;

    let app_users = AppUserRepository::new(state.pool.clone());
    let account = app_users.find_by_jellyfin_user_id(&id).await?;
    if let Some(ref account) = account {
        match enforce_expiry(&state.pool, &client, account).await {
            Ok(true) => user.policy.is_disabled = true,
            Ok(false) => {}
            Err(e) => warn!(
                username = %account.username,
                error = %e,
                "Lazy expiry enforcement failed"
            ),
        }
    }

    let expires_at = account.and_then(|a| a.expires_at);
    let status = account_status(expires_at, user.policy.is_disabled, Utc::now());
    Ok(Json(UserResponse::from_parts(user, expires_at, status)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate()?;

    let client = connected_client(&state.pool, &state.http).await?;
    let mut user = client.create_user(&request.username, &request.password).await?;

    let role = request.role.unwrap_or(RoleLabel::User);
    role.apply_to_policy(&mut user.policy);
    client.update_policy(&user.id, &user.policy).await?;

    info!(username = %user.name, role = role.as_str(), created_by = %current.username, "User created");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::UserCreated,
            format!("User {} created with role {}", user.name, role.as_str()),
        )
        .with_username(user.name.clone())
        .with_jellyfin_user(user.id.clone())
        .by(current.app_user_id),
    )
    .await;

    let status = account_status(None, user.policy.is_disabled, Utc::now());
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_parts(user, None, status)),
    ))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }

    let client = connected_client(&state.pool, &state.http).await?;
    let mut user = fetch_user(&client, &id).await?;

    if let Some(role) = request.role {
        role.apply_to_policy(&mut user.policy);
    }
    if let Some(disabled) = request.is_disabled {
        user.policy.is_disabled = disabled;
    }
    if let Some(all) = request.enable_all_folders {
        user.policy.enable_all_folders = all;
    }
    if let Some(ref folders) = request.enabled_folders {
        user.policy.enabled_folders = folders.clone();
    }
    client.update_policy(&id, &user.policy).await?;

    if let Some(ref password) = request.password {
        client.set_password(&id, password).await?;
    }

    // Mirror the changes onto the linked account so expiry classification
    // and dashboard login agree with upstream.
    let app_users = AppUserRepository::new(state.pool.clone());
    let account = app_users.find_by_jellyfin_user_id(&id).await?;
    if let Some(ref account) = account {
        if let Some(disabled) = request.is_disabled {
            app_users
                .update_user(account.id, None, None, Some(disabled))
                .await?;
            if disabled {
                SessionRepository::new(state.pool.clone())
                    .delete_for_user(account.id)
                    .await?;
            }
        }
        if let Some(ref password) = request.password {
            let hash = shared::password::hash_password(password)
                .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
            app_users.update_password_hash(account.id, &hash).await?;
        }
    }

    let activity_type = match request.is_disabled {
        Some(true) => ActivityType::UserDisabled,
        Some(false) => ActivityType::UserEnabled,
        None => ActivityType::UserUpdated,
    };
    append_activity(
        &state,
        NewActivity::new(activity_type, format!("User {} updated", user.name))
            .with_username(user.name.clone())
            .with_jellyfin_user(id.clone())
            .by(current.app_user_id),
    )
    .await;

    let expires_at = account.and_then(|a| a.expires_at);
    let status = account_status(expires_at, user.policy.is_disabled, Utc::now());
    Ok(Json(UserResponse::from_parts(user, expires_at, status)))
}

/// DELETE /api/users/:id
///
/// Deletes the upstream account, then the local record linked to it.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let client = connected_client(&state.pool, &state.http).await?;
    let user = fetch_user(&client, &id).await?;

    client.delete_user(&id).await?;

    let app_users = AppUserRepository::new(state.pool.clone());
    app_users.delete_by_jellyfin_user_id(&id).await?;

    info!(username = %user.name, deleted_by = %current.username, "User deleted");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::UserDeleted,
            format!("User {} deleted", user.name),
        )
        .with_username(user.name)
        .with_jellyfin_user(id)
        .by(current.app_user_id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:id/favorites
pub async fn favorites(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemsResult>, ApiError> {
    let client = connected_client(&state.pool, &state.http).await?;
    let items = client.favorites(&id).await.map_err(not_found_or_upstream)?;
    Ok(Json(items))
}

/// GET /api/users/:id/history
pub async fn watch_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemsResult>, ApiError> {
    let settings = SettingsRepository::new(state.pool.clone());
    if !settings.get_settings().await?.watch_history_enabled {
        return Err(ApiError::Forbidden("Watch history is disabled".into()));
    }

    let client = connected_client(&state.pool, &state.http).await?;
    let items = client
        .watch_history(&id)
        .await
        .map_err(not_found_or_upstream)?;
    Ok(Json(items))
}

async fn fetch_user(client: &JellyfinClient, id: &str) -> Result<domain::models::jellyfin::JellyfinUser, ApiError> {
    client.get_user(id).await.map_err(not_found_or_upstream)
}

fn not_found_or_upstream(err: JellyfinError) -> ApiError {
    if JellyfinClient::is_not_found(&err) {
        ApiError::NotFound("User not found".into())
    } else {
        err.into()
    }
}

async fn append_activity(state: &AppState, entry: NewActivity) {
    let activity = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append activity entry");
    }
}

//! User profile template endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::activity::{ActivityType, NewActivity};
use domain::models::profile::{CreateProfileRequest, UpdateProfileRequest, UserProfile};
use persistence::repositories::{ActivityLogRepository, NewProfileRow, ProfileRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Listing envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListProfilesResponse {
    pub data: Vec<UserProfile>,
}

/// GET /api/user-profiles
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<ListProfilesResponse>, ApiError> {
    let profiles = ProfileRepository::new(state.pool.clone());
    let data = profiles
        .list_profiles()
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();
    Ok(Json(ListProfilesResponse { data }))
}

/// POST /api/user-profiles
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    request.validate()?;

    let profiles = ProfileRepository::new(state.pool.clone());
    let mut row = profiles
        .create_profile(NewProfileRow {
            name: request.name,
            source_user_id: request.source_user_id,
            enable_all_folders: request.enable_all_folders,
            enabled_folders: request.enabled_folders,
            home_layout: request.home_layout.unwrap_or(serde_json::Value::Null),
        })
        .await?;

    if request.is_default {
        if let Some(updated) = profiles.set_default(row.id).await? {
            row = updated;
        }
    }

    info!(name = %row.name, created_by = %current.username, "Profile created");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::ProfileCreated,
            format!("Profile {} created", row.name),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(UserProfile::from(row))))
}

/// PUT /api/user-profiles/:id
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate()?;

    let profiles = ProfileRepository::new(state.pool.clone());
    let mut row = profiles
        .update_profile(
            id,
            request.name.as_deref(),
            request.enable_all_folders,
            request.enabled_folders.as_deref(),
            request.home_layout.as_ref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    // Defaulting goes through the transactional flag swap so at most one
    // profile carries it. Clearing happens by defaulting another profile.
    if request.is_default == Some(true) && !row.is_default {
        if let Some(updated) = profiles.set_default(id).await? {
            row = updated;
        }
    }

    append_activity(
        &state,
        NewActivity::new(
            ActivityType::ProfileUpdated,
            format!("Profile {} updated", row.name),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(UserProfile::from(row)))
}

/// DELETE /api/user-profiles/:id
///
/// Refused while any active invite still points at the profile.
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let profiles = ProfileRepository::new(state.pool.clone());
    let row = profiles
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    if profiles.is_referenced_by_invites(id).await? {
        return Err(ApiError::Conflict(
            "Profile is referenced by active invites".into(),
        ));
    }

    profiles.delete_profile(id).await?;

    info!(name = %row.name, deleted_by = %current.username, "Profile deleted");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::ProfileDeleted,
            format!("Profile {} deleted", row.name),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/user-profiles/:id/default
pub async fn set_default_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError> {
    let profiles = ProfileRepository::new(state.pool.clone());
    let row = profiles
        .set_default(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    append_activity(
        &state,
        NewActivity::new(
            ActivityType::ProfileUpdated,
            format!("Profile {} set as default", row.name),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(UserProfile::from(row)))
}

async fn append_activity(state: &AppState, entry: NewActivity) {
    let activity = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append activity entry");
    }
}

//! Dashboard role endpoints.

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
use domain::models::role::{CreateRoleRequest, UpdateRoleRequest, UserRole};
use persistence::repositories::{ActivityLogRepository, RoleRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Listing envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRolesResponse {
    pub data: Vec<UserRole>,
}

/// GET /api/user-roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<ListRolesResponse>, ApiError> {
    let roles = RoleRepository::new(state.pool.clone());
    let data = roles
        .list_roles()
        .await?
        .into_iter()
        .map(UserRole::from)
        .collect();
    Ok(Json(ListRolesResponse { data }))
}

/// POST /api/user-roles
pub async fn create_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<UserRole>), ApiError> {
    request.validate()?;

    let roles = RoleRepository::new(state.pool.clone());
    if roles.find_by_name(&request.name).await?.is_some() {
        return Err(ApiError::Conflict("Role name already exists".into()));
    }

    let permissions = request
        .permissions
        .unwrap_or_else(|| serde_json::json!({}));
    let mut row = roles
        .create_role(
            &request.name,
            request.description.as_deref(),
            request.is_admin,
            &permissions,
        )
        .await?;

    if request.is_default {
        if let Some(updated) = roles.set_default(row.id).await? {
            row = updated;
        }
    }

    info!(name = %row.name, created_by = %current.username, "Role created");
    append_activity(
        &state,
        NewActivity::new(ActivityType::RoleCreated, format!("Role {} created", row.name))
            .by(current.app_user_id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(UserRole::from(row))))
}

/// PUT /api/user-roles/:id
pub async fn update_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserRole>, ApiError> {
    request.validate()?;

    let roles = RoleRepository::new(state.pool.clone());
    if let Some(ref name) = request.name {
        if let Some(existing) = roles.find_by_name(name).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Role name already exists".into()));
            }
        }
    }

    let mut row = roles
        .update_role(
            id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.is_admin,
            request.permissions.as_ref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".into()))?;

    if request.is_default == Some(true) && !row.is_default {
        if let Some(updated) = roles.set_default(id).await? {
            row = updated;
        }
    }

    append_activity(
        &state,
        NewActivity::new(ActivityType::RoleUpdated, format!("Role {} updated", row.name))
            .by(current.app_user_id),
    )
    .await;

    Ok(Json(UserRole::from(row)))
}

/// DELETE /api/user-roles/:id
///
/// Refused while any account still holds the role.
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let roles = RoleRepository::new(state.pool.clone());
    let row = roles
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".into()))?;

    if roles.is_referenced_by_users(id).await? {
        return Err(ApiError::Conflict("Role is assigned to accounts".into()));
    }

    roles.delete_role(id).await?;

    info!(name = %row.name, deleted_by = %current.username, "Role deleted");
    append_activity(
        &state,
        NewActivity::new(ActivityType::RoleDeleted, format!("Role {} deleted", row.name))
            .by(current.app_user_id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/user-roles/:id/default
pub async fn set_default_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRole>, ApiError> {
    let roles = RoleRepository::new(state.pool.clone());
    let row = roles
        .set_default(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".into()))?;

    append_activity(
        &state,
        NewActivity::new(
            ActivityType::RoleUpdated,
            format!("Role {} set as default", row.name),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(UserRole::from(row)))
}

async fn append_activity(state: &AppState, entry: NewActivity) {
    let activity = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append activity entry");
    }
}

//! Invite management and the public redemption endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::activity::{ActivityType, NewActivity};
use domain::models::invite::{
    generate_invite_code, is_invite_code, CreateInviteRequest, Invite, InviteResponse,
    ListInvitesResponse, PublicInviteInfo, RedeemInviteRequest, RedeemInviteResponse,
    UpdateInviteRequest,
};
use persistence::repositories::{
    ActivityLogRepository, InviteRepository, NewInviteRow, ProfileRepository, SettingsRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{record_invite_redemption, CurrentUser};
use crate::services::jellyfin::JellyfinError;
use crate::services::redemption::{self, RedemptionError};

/// GET /api/invites
pub async fn list_invites(
    State(state): State<AppState>,
) -> Result<Json<ListInvitesResponse>, ApiError> {
    let invites = InviteRepository::new(state.pool.clone());
    let now = Utc::now();
    let data = invites
        .list_invites()
        .await?
        .into_iter()
        .map(|row| InviteResponse::from_invite(Invite::from(row), now))
        .collect();
    Ok(Json(ListInvitesResponse { data }))
}

/// POST /api/invites
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    request.validate()?;

    let invites = InviteRepository::new(state.pool.clone());
    let profiles = ProfileRepository::new(state.pool.clone());
    let settings = SettingsRepository::new(state.pool.clone());
    let now = Utc::now();

    if let Some(profile_id) = request.profile_id {
        if profiles.find_by_id(profile_id).await?.is_none() {
            return Err(ApiError::NotFound("Profile not found".into()));
        }
    }

    // An explicit timestamp wins over the relative window; when both are
    // absent the configured default lifetime applies.
    let expires_at = match (request.expires_at, request.expires_in_hours) {
        (Some(at), _) => Some(at),
        (None, Some(hours)) => Some(now + Duration::hours(hours)),
        (None, None) => {
            let defaults = settings.get_settings().await?;
            Some(now + Duration::hours(defaults.default_invite_expiry_hours))
        }
    };

    let user_expiry_minutes = request.user_expiry.as_ref().and_then(|s| s.total_minutes());

    let code = invites.generate_unique_code(generate_invite_code).await?;
    let row = invites
        .create_invite(NewInviteRow {
            code: code.clone(),
            label: request.label,
            user_label: request.user_label,
            profile_id: request.profile_id,
            max_uses: request.max_uses,
            expires_at,
            user_expiry_minutes,
            created_by: Some(current.app_user_id),
        })
        .await?;

    info!(code = %code, created_by = %current.username, "Invite created");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::InviteCreated,
            format!("Invite {} created", code),
        )
        .with_invite_code(code)
        .by(current.app_user_id),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse::from_invite(Invite::from(row), now)),
    ))
}

/// PUT /api/invites/:id
pub async fn update_invite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInviteRequest>,
) -> Result<Json<InviteResponse>, ApiError> {
    request.validate()?;

    let invites = InviteRepository::new(state.pool.clone());
    if let Some(profile_id) = request.profile_id {
        let profiles = ProfileRepository::new(state.pool.clone());
        if profiles.find_by_id(profile_id).await?.is_none() {
            return Err(ApiError::NotFound("Profile not found".into()));
        }
    }

    // The use budget can grow but never shrink below what is already spent.
    let existing = invites
        .find_by_id(id)
        .await?
        .filter(|row| row.is_active)
        .ok_or_else(|| ApiError::NotFound("Invite not found".into()))?;
    if let Some(max) = request.max_uses {
        if max < existing.used_count {
            return Err(ApiError::Validation(format!(
                "max_uses cannot be lower than the {} uses already redeemed",
                existing.used_count
            )));
        }
    }

    let user_expiry_minutes = request.user_expiry.as_ref().and_then(|s| s.total_minutes());
    let row = invites
        .update_invite(
            id,
            request.label.as_deref(),
            request.user_label.as_deref(),
            request.profile_id,
            request.max_uses,
            request.expires_at,
            user_expiry_minutes,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".into()))?;

    append_activity(
        &state,
        NewActivity::new(
            ActivityType::InviteUpdated,
            format!("Invite {} updated", row.code),
        )
        .with_invite_code(row.code.clone())
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(InviteResponse::from_invite(
        Invite::from(row),
        Utc::now(),
    )))
}

/// DELETE /api/invites/:id
///
/// Revokes the invite; the row stays for the audit trail.
pub async fn revoke_invite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let invites = InviteRepository::new(state.pool.clone());
    let row = invites
        .find_by_id(id)
        .await?
        .filter(|row| row.is_active)
        .ok_or_else(|| ApiError::NotFound("Invite not found".into()))?;

    if invites.revoke_invite(id).await? == 0 {
        return Err(ApiError::NotFound("Invite not found".into()));
    }

    info!(code = %row.code, revoked_by = %current.username, "Invite revoked");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::InviteRevoked,
            format!("Invite {} revoked", row.code),
        )
        .with_invite_code(row.code)
        .by(current.app_user_id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/invites/:code/info
///
/// Public preview for the signup page. Revoked and unknown codes are
/// indistinguishable.
pub async fn invite_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PublicInviteInfo>, RedemptionError> {
    if !is_invite_code(&code) {
        return Err(RedemptionError::InviteNotFound);
    }

    let invites = InviteRepository::new(state.pool.clone());
    let row = invites
        .find_by_code(&code)
        .await?
        .filter(|row| row.is_active)
        .ok_or(RedemptionError::InviteNotFound)?;

    let invite = Invite::from(row);
    let redeemable = invite.is_redeemable(Utc::now());
    Ok(Json(PublicInviteInfo {
        code: invite.code,
        user_label: invite.user_label,
        expires_at: invite.expires_at,
        redeemable,
    }))
}

/// POST /api/invites/:code/redeem
///
/// Public endpoint: provisions a Jellyfin account from an invite.
pub async fn redeem_invite(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<RedeemInviteRequest>,
) -> Result<(StatusCode, Json<RedeemInviteResponse>), Response> {
    if let Err(e) = request.validate() {
        return Err(ApiError::from(e).into_response());
    }

    match redemption::redeem(&state.pool, &state.http, &code, &request).await {
        Ok(response) => {
            record_invite_redemption("success");
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            record_invite_redemption(outcome_label(&e));
            Err(e.into_response())
        }
    }
}

fn outcome_label(error: &RedemptionError) -> &'static str {
    match error {
        RedemptionError::InviteNotFound => "invite_not_found",
        RedemptionError::InviteExhausted => "invite_exhausted",
        RedemptionError::InviteExpired => "invite_expired",
        RedemptionError::UsernameTaken => "username_taken",
        RedemptionError::Upstream(JellyfinError::NotConnected) => "service_unavailable",
        RedemptionError::Upstream(_) => "upstream_error",
        RedemptionError::Database(_) | RedemptionError::Internal(_) => "internal_error",
    }
}

/// Appends an activity row, logging instead of failing the request when the
/// insert does not go through.
async fn append_activity(state: &AppState, entry: NewActivity) {
    let activity = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append activity entry");
    }
}

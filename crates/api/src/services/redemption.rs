//! Invite redemption.
//!
//! The use slot is reserved before the upstream account is created and
//! released on a definitive upstream failure, so the counter can transiently
//! overcount but never undercount past the budget.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use domain::models::activity::{ActivityType, NewActivity};
use domain::models::invite::{is_invite_code, RedeemInviteRequest, RedeemInviteResponse};
use domain::models::jellyfin::UserConfiguration;
use domain::services::roles::RoleLabel;
use persistence::repositories::{
    ActivityLogRepository, AppUserRepository, InviteRepository, NewAppUserRow, ProfileRepository,
    RoleRepository,
};
use reqwest::Client;
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, warn};

use crate::services::connection::connected_client;
use crate::services::jellyfin::JellyfinError;

#[derive(Debug, thiserror::Error)]
pub enum RedemptionError {
    #[error("Invite not found")]
    InviteNotFound,

    #[error("Invite has no remaining uses")]
    InviteExhausted,

    #[error("Invite has expired")]
    InviteExpired,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error(transparent)]
    Upstream(#[from] JellyfinError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for RedemptionError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            RedemptionError::InviteNotFound => {
                (StatusCode::NOT_FOUND, "invite_not_found", self.to_string())
            }
            RedemptionError::InviteExhausted => {
                (StatusCode::CONFLICT, "invite_exhausted", self.to_string())
            }
            RedemptionError::InviteExpired => {
                (StatusCode::GONE, "invite_expired", self.to_string())
            }
            RedemptionError::UsernameTaken => {
                (StatusCode::CONFLICT, "username_taken", self.to_string())
            }
            RedemptionError::Upstream(JellyfinError::NotConnected) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                self.to_string(),
            ),
            RedemptionError::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "upstream_error", self.to_string())
            }
            RedemptionError::Database(e) => {
                error!("Redemption database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            RedemptionError::Internal(msg) => {
                error!("Redemption internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({ "error": error_code, "message": message });
        (status, Json(body)).into_response()
    }
}

/// Redeems an invite code, provisioning a Jellyfin account.
pub async fn redeem(
    pool: &PgPool,
    http: &Client,
    code: &str,
    request: &RedeemInviteRequest,
) -> Result<RedeemInviteResponse, RedemptionError> {
    // Codes come from a fixed alphabet; anything else cannot exist.
    if !is_invite_code(code) {
        return Err(RedemptionError::InviteNotFound);
    }

    let invites = InviteRepository::new(pool.clone());
    let profiles = ProfileRepository::new(pool.clone());
    let roles = RoleRepository::new(pool.clone());
    let app_users = AppUserRepository::new(pool.clone());
    let activity = ActivityLogRepository::new(pool.clone());

    let now = Utc::now();

    // Preconditions without side effects: local username collisions fail
    // before a use is consumed.
    if app_users.find_by_username(&request.username).await?.is_some() {
        return Err(RedemptionError::UsernameTaken);
    }

    // Reserve a use slot atomically. A miss is re-read to classify the
    // failure in precondition order: existence, budget, expiry.
    let invite = match invites.reserve_use(code, now).await? {
        Some(row) => row,
        None => {
            let row = invites
                .find_by_code(code)
                .await?
                .ok_or(RedemptionError::InviteNotFound)?;
            if !row.is_active {
                return Err(RedemptionError::InviteNotFound);
            }
            if let Some(max) = row.max_uses {
                if row.used_count >= max {
                    return Err(RedemptionError::InviteExhausted);
                }
            }
            if row.expires_at.is_some_and(|e| e <= now) {
                return Err(RedemptionError::InviteExpired);
            }
            // The row was redeemable on re-read, so the reservation lost a
            // race on the last slot.
            return Err(RedemptionError::InviteExhausted);
        }
    };

    // Invites without an explicit profile fall back to the default one.
    let profile = match invite.profile_id {
        Some(id) => profiles.find_by_id(id).await?,
        None => profiles.find_default().await?,
    };

    // From here on, a failure must roll the reserved slot back.
    let client = match connected_client(pool, http).await {
        Ok(client) => client,
        Err(e) => {
            release_reserved_use(&invites, invite.id).await;
            return Err(e.into());
        }
    };

    let jellyfin_user = match client.create_user(&request.username, &request.password).await {
        Ok(user) => user,
        Err(e) => {
            release_reserved_use(&invites, invite.id).await;
            return Err(e.into());
        }
    };

    // Account exists upstream now; policy application failures are logged
    // but do not undo the redemption.
    let mut policy = jellyfin_user.policy.clone();
    RoleLabel::User.apply_to_policy(&mut policy);
    if let Some(ref profile) = profile {
        policy.enable_all_folders = profile.enable_all_folders;
        policy.enabled_folders = profile.enabled_folders.clone();
    }
    if let Err(e) = client.update_policy(&jellyfin_user.id, &policy).await {
        warn!(
            user_id = %jellyfin_user.id,
            error = %e,
            "Failed to apply policy to redeemed account"
        );
    }

    if let Some(ref profile) = profile {
        if !profile.home_layout.is_null() {
            match serde_json::from_value::<UserConfiguration>(profile.home_layout.clone()) {
                Ok(configuration) => {
                    if let Err(e) = client
                        .update_configuration(&jellyfin_user.id, &configuration)
                        .await
                    {
                        warn!(
                            user_id = %jellyfin_user.id,
                            error = %e,
                            "Failed to apply home layout to redeemed account"
                        );
                    }
                }
                Err(e) => warn!(
                    profile_id = %profile.id,
                    error = %e,
                    "Stored home layout does not deserialize"
                ),
            }
        }
    }

    let expires_at = invite
        .user_expiry_minutes
        .map(|minutes| now + Duration::minutes(minutes));

    let password_hash = shared::password::hash_password(&request.password)
        .map_err(|e| RedemptionError::Internal(format!("password hashing failed: {e}")))?;

    let default_role = roles.find_default().await?;
    let account = app_users
        .create_user(NewAppUserRow {
            username: request.username.clone(),
            password_hash,
            jellyfin_user_id: Some(jellyfin_user.id.clone()),
            role_id: default_role.map(|r| r.id),
            expires_at,
        })
        .await?;

    let entry = NewActivity::new(
        ActivityType::InviteRedeemed,
        format!("Invite {} redeemed by {}", invite.code, account.username),
    )
    .with_username(account.username.clone())
    .with_jellyfin_user(jellyfin_user.id.clone())
    .with_invite_code(invite.code.clone());
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append redemption activity");
    }

    Ok(RedeemInviteResponse {
        jellyfin_user_id: jellyfin_user.id,
        username: account.username,
        expires_at,
    })
}

/// Rolls back a reserved use. A failed release leaves a transient overcount;
/// it is logged for manual reconciliation and never hidden.
async fn release_reserved_use(invites: &InviteRepository, invite_id: uuid::Uuid) {
    if let Err(e) = invites.release_use(invite_id).await {
        error!(
            invite_id = %invite_id,
            error = %e,
            "Failed to release reserved invite use; counter may overcount"
        );
    }
}

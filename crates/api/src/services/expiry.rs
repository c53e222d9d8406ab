//! Account expiry enforcement.
//!
//! Expired accounts are disabled upstream exactly once. The conditional
//! `claim_disable` update arbitrates between the lazy on-access path and the
//! background sweep; whichever claims the row makes the upstream call.

use chrono::Utc;
use domain::models::activity::{ActivityType, NewActivity};
use domain::services::expiry::{account_status, AccountStatus};
use persistence::entities::AppUserEntity;
use persistence::repositories::{ActivityLogRepository, AppUserRepository, SessionRepository};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::services::jellyfin::{JellyfinClient, JellyfinError};

#[derive(Debug, thiserror::Error)]
pub enum ExpiryError {
    #[error(transparent)]
    Upstream(#[from] JellyfinError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ExpiryError> for crate::error::ApiError {
    fn from(err: ExpiryError) -> Self {
        match err {
            ExpiryError::Upstream(e) => e.into(),
            ExpiryError::Database(e) => e.into(),
        }
    }
}

/// Disables an account upstream if it has expired and nobody else got there
/// first. Returns true when this call performed the disable.
pub async fn enforce_expiry(
    pool: &PgPool,
    client: &JellyfinClient,
    account: &AppUserEntity,
) -> Result<bool, ExpiryError> {
    let status = account_status(account.expires_at, account.is_disabled, Utc::now());
    if status != AccountStatus::Expired {
        return Ok(false);
    }

    let app_users = AppUserRepository::new(pool.clone());
    let claimed = app_users.claim_disable(account.id).await?;
    if !claimed {
        // Another caller is handling this account.
        return Ok(false);
    }

    // A disabled account does not keep its dashboard logins.
    let sessions = SessionRepository::new(pool.clone());
    if let Err(e) = sessions.delete_for_user(account.id).await {
        warn!(
            account_id = %account.id,
            error = %e,
            "Failed to revoke sessions for expired account"
        );
    }

    let jellyfin_user_id = match &account.jellyfin_user_id {
        Some(id) => id.clone(),
        None => {
            // Local-only account; the flag alone disables it.
            log_expiry(pool, account, None).await;
            return Ok(true);
        }
    };

    let mut user = match client.get_user(&jellyfin_user_id).await {
        Ok(user) => user,
        Err(e) if JellyfinClient::is_not_found(&e) => {
            // Account vanished upstream; nothing left to disable.
            log_expiry(pool, account, Some(&jellyfin_user_id)).await;
            return Ok(true);
        }
        Err(e) => {
            release_claim(&app_users, account).await;
            return Err(e.into());
        }
    };

    user.policy.is_disabled = true;
    if let Err(e) = client.update_policy(&jellyfin_user_id, &user.policy).await {
        release_claim(&app_users, account).await;
        return Err(e.into());
    }

    info!(
        username = %account.username,
        jellyfin_user_id = %jellyfin_user_id,
        "Expired account disabled"
    );
    log_expiry(pool, account, Some(&jellyfin_user_id)).await;
    Ok(true)
}

async fn release_claim(app_users: &AppUserRepository, account: &AppUserEntity) {
    if let Err(e) = app_users.release_disable(account.id).await {
        warn!(
            account_id = %account.id,
            error = %e,
            "Failed to release expiry claim after upstream failure"
        );
    }
}

async fn log_expiry(pool: &PgPool, account: &AppUserEntity, jellyfin_user_id: Option<&str>) {
    let activity = ActivityLogRepository::new(pool.clone());
    let mut entry = NewActivity::new(
        ActivityType::UserExpired,
        format!("Account {} expired and was disabled", account.username),
    )
    .with_username(account.username.clone())
    .with_metadata(serde_json::json!({ "expires_at": account.expires_at }));
    if let Some(id) = jellyfin_user_id {
        entry = entry.with_jellyfin_user(id);
    }
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append expiry activity");
    }
}

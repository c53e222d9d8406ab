//! Admin bootstrap for initial setup.
//!
//! Creates the first operator account on startup when the accounts table is
//! empty and credentials are configured. Idempotent across restarts.

use persistence::repositories::{AppUserRepository, NewAppUserRow, RoleRepository};
use shared::password::{hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AuthConfig;

const ADMIN_ROLE_NAME: &str = "Administrator";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// Bootstrap the admin account if configured and not already done.
///
/// Called after migrations on startup.
pub async fn bootstrap_admin(pool: &PgPool, config: &AuthConfig) -> Result<(), BootstrapError> {
    if config.bootstrap_username.is_empty() {
        return Ok(());
    }

    if config.bootstrap_password.is_empty() {
        warn!(
            "FINBOARD__AUTH__BOOTSTRAP_USERNAME is set but FINBOARD__AUTH__BOOTSTRAP_PASSWORD is empty - skipping bootstrap"
        );
        return Ok(());
    }

    let app_users = AppUserRepository::new(pool.clone());
    if app_users.count_users().await? > 0 {
        return Ok(());
    }

    let roles = RoleRepository::new(pool.clone());
    let admin_role = match roles.find_by_name(ADMIN_ROLE_NAME).await? {
        Some(role) => role,
        None => {
            roles
                .create_role(
                    ADMIN_ROLE_NAME,
                    Some("Full dashboard access"),
                    true,
                    &serde_json::json!({ "label": "Administrator" }),
                )
                .await?
        }
    };

    let password_hash = hash_password(&config.bootstrap_password)?;
    let account = app_users
        .create_user(NewAppUserRow {
            username: config.bootstrap_username.clone(),
            password_hash,
            jellyfin_user_id: None,
            role_id: Some(admin_role.id),
            expires_at: None,
        })
        .await?;

    info!(
        username = %account.username,
        account_id = %account.id,
        "Bootstrap admin account created"
    );
    warn!(
        "SECURITY: Remove FINBOARD__AUTH__BOOTSTRAP_USERNAME and FINBOARD__AUTH__BOOTSTRAP_PASSWORD from the environment after first start"
    );

    Ok(())
}

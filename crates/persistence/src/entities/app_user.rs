//! Panel account entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::app_user::AppUser;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the app_users table.
#[derive(Debug, Clone, FromRow)]
pub struct AppUserEntity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub jellyfin_user_id: Option<String>,
    pub role_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AppUserEntity> for AppUser {
    fn from(e: AppUserEntity) -> Self {
        // The password hash never leaves the persistence layer.
        AppUser {
            id: e.id,
            username: e.username,
            jellyfin_user_id: e.jellyfin_user_id,
            role_id: e.role_id,
            expires_at: e.expires_at,
            is_disabled: e.is_disabled,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

//! User profile entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::profile::UserProfile;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the user_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileEntity {
    pub id: Uuid,
    pub name: String,
    pub source_user_id: Option<String>,
    pub enable_all_folders: bool,
    pub enabled_folders: Vec<String>,
    pub home_layout: serde_json::Value,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileEntity> for UserProfile {
    fn from(e: UserProfileEntity) -> Self {
        UserProfile {
            id: e.id,
            name: e.name,
            source_user_id: e.source_user_id,
            enable_all_folders: e.enable_all_folders,
            enabled_folders: e.enabled_folders,
            home_layout: e.home_layout,
            is_default: e.is_default,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

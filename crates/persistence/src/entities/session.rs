//! Session entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionEntity {
    pub id: Uuid,
    pub app_user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Session joined with its account and role flags, for auth lookups.
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithUserEntity {
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub app_user_id: Uuid,
    pub username: String,
    pub role_id: Option<Uuid>,
    pub is_disabled: bool,
    /// From the joined role; false when the account has no role.
    pub is_admin: bool,
}

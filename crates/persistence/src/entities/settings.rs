//! Settings entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the jellyfin_credentials singleton row.
#[derive(Debug, Clone, FromRow)]
pub struct JellyfinCredentialsEntity {
    pub id: i32,
    pub base_url: String,
    pub admin_username: Option<String>,
    pub access_token: Option<String>,
    pub connected: bool,
    pub updated_at: DateTime<Utc>,
}

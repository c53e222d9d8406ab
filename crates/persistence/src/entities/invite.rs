//! Invite entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::invite::Invite;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the invites table.
#[derive(Debug, Clone, FromRow)]
pub struct InviteEntity {
    pub id: Uuid,
    pub code: String,
    pub label: Option<String>,
    pub user_label: Option<String>,
    pub profile_id: Option<Uuid>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_expiry_minutes: Option<i64>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<InviteEntity> for Invite {
    fn from(e: InviteEntity) -> Self {
        Invite {
            id: e.id,
            code: e.code,
            label: e.label,
            user_label: e.user_label,
            profile_id: e.profile_id,
            max_uses: e.max_uses,
            used_count: e.used_count,
            expires_at: e.expires_at,
            user_expiry_minutes: e.user_expiry_minutes,
            is_active: e.is_active,
            created_by: e.created_by,
            created_at: e.created_at,
        }
    }
}

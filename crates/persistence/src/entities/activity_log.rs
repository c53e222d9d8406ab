//! Activity log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::activity::ActivityEntry;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the activity_logs table. Rows are append-only.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogEntity {
    pub id: i64,
    pub activity_type: String,
    pub message: String,
    pub username: Option<String>,
    pub jellyfin_user_id: Option<String>,
    pub invite_code: Option<String>,
    pub created_by: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLogEntity> for ActivityEntry {
    fn from(e: ActivityLogEntity) -> Self {
        ActivityEntry {
            id: e.id,
            activity_type: e.activity_type,
            message: e.message,
            username: e.username,
            jellyfin_user_id: e.jellyfin_user_id,
            invite_code: e.invite_code,
            created_by: e.created_by,
            metadata: e.metadata,
            created_at: e.created_at,
        }
    }
}

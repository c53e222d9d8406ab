//! Application role entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::role::UserRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the user_roles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    pub is_admin: bool,
    pub permissions: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRoleEntity> for UserRole {
    fn from(e: UserRoleEntity) -> Self {
        UserRole {
            id: e.id,
            name: e.name,
            description: e.description,
            is_default: e.is_default,
            is_admin: e.is_admin,
            permissions: e.permissions,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

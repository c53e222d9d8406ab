//! Application-level role models.
//!
//! These are panel roles (who may administer the dashboard), distinct from
//! the Jellyfin policy flags handled in `services::roles`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An application role row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserRole {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// At most one role carries this flag.
    pub is_default: bool,
    pub is_admin: bool,
    pub permissions: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a role.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 64, message = "name must be between 1 and 64 characters"))]
    pub name: String,

    #[validate(length(max = 512, message = "description must be at most 512 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default)]
    pub is_admin: bool,

    pub permissions: Option<serde_json::Value>,
}

/// Request to update a role. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 64, message = "name must be between 1 and 64 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 512, message = "description must be at most 512 characters"))]
    pub description: Option<String>,

    pub is_default: Option<bool>,
    pub is_admin: Option<bool>,
    pub permissions: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_request_validation() {
        let valid = CreateRoleRequest {
            name: "Moderator".to_string(),
            description: None,
            is_default: false,
            is_admin: false,
            permissions: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateRoleRequest {
            name: String::new(),
            ..valid
        };
        assert!(empty_name.validate().is_err());
    }
}

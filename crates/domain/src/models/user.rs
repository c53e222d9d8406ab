//! Dashboard views over Jellyfin users.
//!
//! These combine the upstream user object with the local expiry
//! bookkeeping into the shape the dashboard renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::jellyfin::{JellyfinUser, UserPolicy};
use crate::services::expiry::AccountStatus;
use crate::services::roles::RoleLabel;

/// A managed user as shown in the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub role: RoleLabel,
    pub status: String,
    pub remaining_minutes: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_disabled: bool,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub policy: UserPolicy,
}

impl UserResponse {
    /// Builds the view from the upstream user plus local expiry state.
    pub fn from_parts(
        user: JellyfinUser,
        expires_at: Option<DateTime<Utc>>,
        status: AccountStatus,
    ) -> Self {
        let role = RoleLabel::from_policy(&user.policy);
        Self {
            id: user.id,
            name: user.name,
            role,
            status: status.as_str().to_string(),
            remaining_minutes: status.remaining_minutes(),
            expires_at,
            is_disabled: user.policy.is_disabled,
            last_activity_date: user.last_activity_date,
            policy: user.policy,
        }
    }
}

/// Request to create a Jellyfin user from the dashboard.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateUserRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "password must not be empty"))]
    pub password: String,

    /// Role to assign; defaults to `User`.
    pub role: Option<RoleLabel>,
}

/// Request to update a Jellyfin user. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateUserRequest {
    pub role: Option<RoleLabel>,
    pub is_disabled: Option<bool>,
    pub enable_all_folders: Option<bool>,
    pub enabled_folders: Option<Vec<String>>,

    #[validate(length(min = 1, max = 256, message = "password must not be empty"))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.is_disabled.is_none()
            && self.enable_all_folders.is_none()
            && self.enabled_folders.is_none()
            && self.password.is_none()
    }
}

/// Listing envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListUsersResponse {
    pub data: Vec<UserResponse>,
}

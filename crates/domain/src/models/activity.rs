//! Activity log vocabulary and entry builder.
//!
//! Every mutating action appends one row; rows are immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserDisabled,
    UserEnabled,
    UserExpired,
    InviteCreated,
    InviteUpdated,
    InviteRevoked,
    InviteRedeemed,
    ProfileCreated,
    ProfileUpdated,
    ProfileDeleted,
    RoleCreated,
    RoleUpdated,
    RoleDeleted,
    SettingsUpdated,
    ServerConnected,
    ServerDisconnected,
}

impl ActivityType {
    /// Stable string form used in the database and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::UserCreated => "user_created",
            ActivityType::UserUpdated => "user_updated",
            ActivityType::UserDeleted => "user_deleted",
            ActivityType::UserDisabled => "user_disabled",
            ActivityType::UserEnabled => "user_enabled",
            ActivityType::UserExpired => "user_expired",
            ActivityType::InviteCreated => "invite_created",
            ActivityType::InviteUpdated => "invite_updated",
            ActivityType::InviteRevoked => "invite_revoked",
            ActivityType::InviteRedeemed => "invite_redeemed",
            ActivityType::ProfileCreated => "profile_created",
            ActivityType::ProfileUpdated => "profile_updated",
            ActivityType::ProfileDeleted => "profile_deleted",
            ActivityType::RoleCreated => "role_created",
            ActivityType::RoleUpdated => "role_updated",
            ActivityType::RoleDeleted => "role_deleted",
            ActivityType::SettingsUpdated => "settings_updated",
            ActivityType::ServerConnected => "server_connected",
            ActivityType::ServerDisconnected => "server_disconnected",
        }
    }
}

/// Input for appending an activity row, with a builder in the style of the
/// request models: start from the type and message, chain context on.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub message: String,
    pub username: Option<String>,
    pub jellyfin_user_id: Option<String>,
    pub invite_code: Option<String>,
    pub created_by: Option<Uuid>,
    pub metadata: serde_json::Value,
}

impl NewActivity {
    pub fn new(activity_type: ActivityType, message: impl Into<String>) -> Self {
        Self {
            activity_type,
            message: message.into(),
            username: None,
            jellyfin_user_id: None,
            invite_code: None,
            created_by: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_jellyfin_user(mut self, user_id: impl Into<String>) -> Self {
        self.jellyfin_user_id = Some(user_id.into());
        self
    }

    pub fn with_invite_code(mut self, code: impl Into<String>) -> Self {
        self.invite_code = Some(code.into());
        self
    }

    pub fn by(mut self, operator_id: Uuid) -> Self {
        self.created_by = Some(operator_id);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// An activity row as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityEntry {
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

/// Page of activity rows with a continuation cursor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityPage {
    pub data: Vec<ActivityEntry>,
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_strings_are_snake_case() {
        assert_eq!(ActivityType::InviteRedeemed.as_str(), "invite_redeemed");
        assert_eq!(ActivityType::UserExpired.as_str(), "user_expired");
    }

    #[test]
    fn test_activity_type_serde_matches_as_str() {
        let json = serde_json::to_string(&ActivityType::ServerConnected).unwrap();
        assert_eq!(json, "\"server_connected\"");
        assert_eq!(ActivityType::ServerConnected.as_str(), "server_connected");
    }

    #[test]
    fn test_new_activity_builder() {
        let operator = Uuid::new_v4();
        let entry = NewActivity::new(ActivityType::InviteRedeemed, "invite ABC234 redeemed")
            .with_username("alice")
            .with_invite_code("ABC234")
            .by(operator);

        assert_eq!(entry.username.as_deref(), Some("alice"));
        assert_eq!(entry.invite_code.as_deref(), Some("ABC234"));
        assert_eq!(entry.created_by, Some(operator));
        assert!(entry.metadata.is_null());
    }
}

//! Wire DTOs for the Jellyfin REST API.
//!
//! These mirror the upstream JSON shapes (PascalCase fields). The wire
//! format is Jellyfin's, not ours; fields we do not use are ignored on
//! deserialization and omitted on serialization via `default`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission bundle attached to a Jellyfin user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPolicy {
    pub is_administrator: bool,
    pub is_disabled: bool,
    pub is_hidden: bool,
    pub enable_all_folders: bool,
    pub enabled_folders: Vec<String>,
    pub enable_media_playback: bool,
    pub enable_content_deletion: bool,
    pub enable_content_downloading: bool,
    pub enable_live_tv_access: bool,
    pub enable_remote_access: bool,
}

impl Default for UserPolicy {
    fn default() -> Self {
        // Matches the policy Jellyfin assigns to a freshly created user.
        Self {
            is_administrator: false,
            is_disabled: false,
            is_hidden: true,
            enable_all_folders: false,
            enabled_folders: Vec::new(),
            enable_media_playback: true,
            enable_content_deletion: false,
            enable_content_downloading: true,
            enable_live_tv_access: true,
            enable_remote_access: true,
        }
    }
}

/// Display configuration attached to a Jellyfin user (home layout).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserConfiguration {
    pub grouped_folders: Vec<String>,
    pub ordered_views: Vec<String>,
    pub latest_items_excludes: Vec<String>,
    pub hide_played_in_latest: bool,
    pub subtitle_mode: Option<String>,
}

/// A Jellyfin user object as returned by `/Users` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JellyfinUser {
    pub id: String,
    pub name: String,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub last_login_date: Option<DateTime<Utc>>,
    pub policy: UserPolicy,
    pub configuration: UserConfiguration,
}

impl Default for JellyfinUser {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            last_activity_date: None,
            last_login_date: None,
            policy: UserPolicy::default(),
            configuration: UserConfiguration::default(),
        }
    }
}

/// Body for `POST /Users/New`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserByName {
    pub name: String,
    pub password: String,
}

/// Body for `POST /Users/AuthenticateByName`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticateByName {
    pub username: String,
    pub pw: String,
}

/// Result of a successful authentication call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub user: JellyfinUser,
    pub access_token: String,
    #[serde(default)]
    pub server_id: Option<String>,
}

/// Response of `GET /System/Info/Public`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicSystemInfo {
    pub server_name: String,
    pub version: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Per-user playback state attached to library items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserItemData {
    pub played: bool,
    pub is_favorite: bool,
    pub play_count: i64,
    pub last_played_date: Option<DateTime<Utc>>,
}

/// A library item, as returned by `/Users/{id}/Items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MediaItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    pub series_name: Option<String>,
    pub production_year: Option<i32>,
    pub user_data: Option<UserItemData>,
}

/// Paged item listing envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ItemsResult {
    pub items: Vec<MediaItem>,
    pub total_record_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_deserializes_pascal_case() {
        let json = r#"{"IsAdministrator":true,"EnabledFolders":["lib1"],"EnableMediaPlayback":true}"#;
        let policy: UserPolicy = serde_json::from_str(json).unwrap();
        assert!(policy.is_administrator);
        assert_eq!(policy.enabled_folders, vec!["lib1"]);
        // Unspecified fields fall back to defaults.
        assert!(!policy.is_disabled);
    }

    #[test]
    fn test_policy_serializes_pascal_case() {
        let policy = UserPolicy::default();
        let json = serde_json::to_value(&policy).unwrap();
        assert!(json.get("EnableMediaPlayback").is_some());
        assert!(json.get("enable_media_playback").is_none());
    }

    #[test]
    fn test_items_result_ignores_unknown_fields() {
        let json = r#"{"Items":[{"Id":"abc","Name":"Film","Type":"Movie","ImageTags":{}}],"TotalRecordCount":1,"StartIndex":0}"#;
        let result: ItemsResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].item_type, "Movie");
    }
}

//! User profile models.
//!
//! A profile is a named template of library access and home-layout settings
//! captured from a source Jellyfin user and stamped onto invited accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A stored profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    /// Jellyfin user the settings were captured from, if any.
    pub source_user_id: Option<String>,
    pub enable_all_folders: bool,
    pub enabled_folders: Vec<String>,
    /// Home-layout configuration blob, in Jellyfin's own shape.
    pub home_layout: serde_json::Value,
    /// At most one profile carries this flag.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 64, message = "name must be between 1 and 64 characters"))]
    pub name: String,

    pub source_user_id: Option<String>,

    #[serde(default)]
    pub enable_all_folders: bool,

    #[serde(default)]
    pub enabled_folders: Vec<String>,

    pub home_layout: Option<serde_json::Value>,

    #[serde(default)]
    pub is_default: bool,
}

/// Request to update a profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 64, message = "name must be between 1 and 64 characters"))]
    pub name: Option<String>,

    pub source_user_id: Option<String>,
    pub enable_all_folders: Option<bool>,
    pub enabled_folders: Option<Vec<String>>,
    pub home_layout: Option<serde_json::Value>,
    pub is_default: Option<bool>,
}

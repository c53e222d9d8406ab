//! Application settings and connection-management models.
//!
//! Settings live in the `server_config` table rather than files, so they
//! can be edited from the dashboard at runtime.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Dashboard feature toggles and defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct AppSettings {
    pub theme_switcher_enabled: bool,
    pub watch_history_enabled: bool,
    pub activity_log_enabled: bool,
    /// Default invite lifetime when a create request omits expiry.
    pub default_invite_expiry_hours: i64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_switcher_enabled: true,
            watch_history_enabled: true,
            activity_log_enabled: true,
            default_invite_expiry_hours: 24,
        }
    }
}

/// Partial settings update. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateSettingsRequest {
    pub theme_switcher_enabled: Option<bool>,
    pub watch_history_enabled: Option<bool>,
    pub activity_log_enabled: Option<bool>,

    #[validate(range(
        min = 1,
        max = 8760,
        message = "default_invite_expiry_hours must be between 1 and 8760"
    ))]
    pub default_invite_expiry_hours: Option<i64>,
}

impl UpdateSettingsRequest {
    /// Applies the present fields onto existing settings.
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(v) = self.theme_switcher_enabled {
            settings.theme_switcher_enabled = v;
        }
        if let Some(v) = self.watch_history_enabled {
            settings.watch_history_enabled = v;
        }
        if let Some(v) = self.activity_log_enabled {
            settings.activity_log_enabled = v;
        }
        if let Some(v) = self.default_invite_expiry_hours {
            settings.default_invite_expiry_hours = v;
        }
    }
}

/// Request to connect the dashboard to a Jellyfin server.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ConnectRequest {
    #[validate(custom(function = "shared::validation::validate_server_url"))]
    pub url: String,

    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Request to probe a candidate server URL.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ValidateUrlRequest {
    #[validate(custom(function = "shared::validation::validate_server_url"))]
    pub url: String,
}

/// Result of a URL probe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ValidateUrlResponse {
    pub valid: bool,
    pub server_name: Option<String>,
    pub version: Option<String>,
}

/// Stored connection state plus a live reachability check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectionStatusResponse {
    pub connected: bool,
    pub base_url: Option<String>,
    pub server_name: Option<String>,
    pub version: Option<String>,
}

/// Overall system status for the dashboard landing page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SystemStatusResponse {
    pub version: String,
    pub database_connected: bool,
    pub jellyfin_connected: bool,
    pub managed_user_count: i64,
    pub active_invite_count: i64,
    pub activity_count: i64,
}

//! Panel account and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A panel account. Operator accounts and invite-provisioned accounts both
/// live here; the latter are linked to their Jellyfin user and carry the
/// expiry bookkeeping from the invite that created them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppUser {
    pub id: Uuid,
    pub username: String,
    pub jellyfin_user_id: Option<String>,
    pub role_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login request for the panel.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Successful login: an opaque bearer token plus the account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AppUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_password = LoginRequest {
            password: String::new(),
            ..valid
        };
        assert!(empty_password.validate().is_err());
    }
}

//! Common validation utilities.

use validator::ValidationError;

/// Maximum length for account usernames (matches the Jellyfin server limit).
const MAX_USERNAME_LENGTH: usize = 64;

/// Validates an account username: 1-64 characters, no leading/trailing
/// whitespace, no control characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
        let mut err = ValidationError::new("username_length");
        err.message = Some("Username must be between 1 and 64 characters".into());
        return Err(err);
    }
    if username.trim() != username {
        let mut err = ValidationError::new("username_whitespace");
        err.message = Some("Username cannot start or end with whitespace".into());
        return Err(err);
    }
    if username.chars().any(char::is_control) {
        let mut err = ValidationError::new("username_control_chars");
        err.message = Some("Username cannot contain control characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a server URL is http(s) with a host.
pub fn validate_server_url(url: &str) -> Result<(), ValidationError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    let valid = match rest {
        Some(rest) => {
            let host = rest.split('/').next().unwrap_or("");
            !host.is_empty() && !host.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("server_url");
        err.message = Some("URL must start with http:// or https:// and include a host".into());
        Err(err)
    }
}

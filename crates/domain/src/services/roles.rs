//! Role-label derivation from Jellyfin policy flags.
//!
//! The upstream API expresses "role" as loose booleans on the policy.
//! That mapping is computed exactly once here, at the boundary, and the
//! rest of the system works with the explicit variant.

use serde::{Deserialize, Serialize};

use crate::models::jellyfin::UserPolicy;

/// Explicit role label for a Jellyfin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleLabel {
    Administrator,
    ContentManager,
    User,
}

impl RoleLabel {
    /// Derives the label from policy flags.
    pub fn from_policy(policy: &UserPolicy) -> Self {
        if policy.is_administrator {
            RoleLabel::Administrator
        } else if policy.enable_media_playback && policy.enable_content_deletion {
            RoleLabel::ContentManager
        } else {
            RoleLabel::User
        }
    }

    /// Applies the label back onto a policy, adjusting exactly the flags
    /// the label is derived from.
    pub fn apply_to_policy(&self, policy: &mut UserPolicy) {
        match self {
            RoleLabel::Administrator => {
                policy.is_administrator = true;
                policy.enable_media_playback = true;
                policy.enable_content_deletion = true;
            }
            RoleLabel::ContentManager => {
                policy.is_administrator = false;
                policy.enable_media_playback = true;
                policy.enable_content_deletion = true;
            }
            RoleLabel::User => {
                policy.is_administrator = false;
                policy.enable_media_playback = true;
                policy.enable_content_deletion = false;
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleLabel::Administrator => "Administrator",
            RoleLabel::ContentManager => "ContentManager",
            RoleLabel::User => "User",
        }
    }
}

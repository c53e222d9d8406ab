//! Invite domain models for signup invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A signup invite. Redeeming one provisions a Jellyfin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invite {
    pub id: Uuid,
    pub code: String,
    pub label: Option<String>,
    /// Label stamped onto accounts created through this invite.
    pub user_label: Option<String>,
    pub profile_id: Option<Uuid>,
    /// None means unlimited uses.
    pub max_uses: Option<i32>,
    pub used_count: i32,
    /// None means the invite never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Consolidated account-expiry duration applied to redeemed accounts.
    /// None means redeemed accounts are permanent.
    pub user_expiry_minutes: Option<i64>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Whether the invite can still be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.max_uses.map_or(true, |max| self.used_count < max)
            && self.expires_at.map_or(true, |e| now < e)
    }
}

/// Account-expiry duration for accounts created through an invite.
///
/// The months/days/hours/minutes split exists only in the request payload;
/// it collapses to a single minute count at the data-model boundary.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case", default)]
pub struct UserExpirySpec {
    pub enabled: bool,

    #[validate(range(min = 0, max = 120, message = "months must be between 0 and 120"))]
    pub months: i64,

    #[validate(range(min = 0, max = 3650, message = "days must be between 0 and 3650"))]
    pub days: i64,

    #[validate(range(min = 0, max = 8760, message = "hours must be between 0 and 8760"))]
    pub hours: i64,

    #[validate(range(min = 0, max = 525600, message = "minutes must be between 0 and 525600"))]
    pub minutes: i64,
}

/// Minutes per month, using the 30-day convention.
const MINUTES_PER_MONTH: i64 = 30 * 24 * 60;

impl UserExpirySpec {
    /// Collapses the split fields into a single duration.
    ///
    /// Returns None when expiry is disabled or the total is zero.
    pub fn total_minutes(&self) -> Option<i64> {
        if !self.enabled {
            return None;
        }
        let total = self.months * MINUTES_PER_MONTH
            + self.days * 24 * 60
            + self.hours * 60
            + self.minutes;
        (total > 0).then_some(total)
    }
}

/// Request to create a new invite.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInviteRequest {
    #[validate(length(max = 128, message = "label must be at most 128 characters"))]
    pub label: Option<String>,

    #[validate(length(max = 128, message = "user_label must be at most 128 characters"))]
    pub user_label: Option<String>,

    pub profile_id: Option<Uuid>,

    /// Maximum redemptions (omit for unlimited).
    #[validate(range(min = 1, max = 1000, message = "max_uses must be between 1 and 1000"))]
    pub max_uses: Option<i32>,

    /// Hours until the invite itself expires. Omit to use the configured
    /// default; an explicit `expires_at` takes precedence.
    #[validate(range(
        min = 1,
        max = 8760,
        message = "expires_in_hours must be between 1 and 8760"
    ))]
    pub expires_in_hours: Option<i64>,

    /// Absolute expiry timestamp; null means the invite never expires.
    pub expires_at: Option<DateTime<Utc>>,

    #[validate(nested)]
    pub user_expiry: Option<UserExpirySpec>,
}

/// Request to update an existing invite. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateInviteRequest {
    #[validate(length(max = 128, message = "label must be at most 128 characters"))]
    pub label: Option<String>,

    #[validate(length(max = 128, message = "user_label must be at most 128 characters"))]
    pub user_label: Option<String>,

    pub profile_id: Option<Uuid>,

    #[validate(range(min = 1, max = 1000, message = "max_uses must be between 1 and 1000"))]
    pub max_uses: Option<i32>,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(nested)]
    pub user_expiry: Option<UserExpirySpec>,
}

/// Invite representation returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteResponse {
    pub id: Uuid,
    pub code: String,
    pub label: Option<String>,
    pub user_label: Option<String>,
    pub profile_id: Option<Uuid>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_expiry_minutes: Option<i64>,
    pub is_active: bool,
    pub redeemable: bool,
    pub created_at: DateTime<Utc>,
}

impl InviteResponse {
    pub fn from_invite(invite: Invite, now: DateTime<Utc>) -> Self {
        let redeemable = invite.is_redeemable(now);
        Self {
            id: invite.id,
            code: invite.code,
            label: invite.label,
            user_label: invite.user_label,
            profile_id: invite.profile_id,
            max_uses: invite.max_uses,
            used_count: invite.used_count,
            expires_at: invite.expires_at,
            user_expiry_minutes: invite.user_expiry_minutes,
            is_active: invite.is_active,
            redeemable,
            created_at: invite.created_at,
        }
    }
}

/// Listing envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitesResponse {
    pub data: Vec<InviteResponse>,
}

/// Public invite preview, returned without authentication on the signup page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicInviteInfo {
    pub code: String,
    pub user_label: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub redeemable: bool,
}

/// Request to redeem an invite code and create an account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RedeemInviteRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "password must not be empty"))]
    pub password: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
}

/// Response after a successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RedeemInviteResponse {
    pub jellyfin_user_id: String,
    pub username: String,
    pub expires_at: Option<DateTime<Utc>>,
}

lazy_static::lazy_static! {
    static ref INVITE_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z2-9]{6}$").unwrap();
}

/// Returns whether a string looks like an invite code.
pub fn is_invite_code(code: &str) -> bool {
    INVITE_CODE_REGEX.is_match(code)
}

/// Generate a random 6-character invite code.
pub fn generate_invite_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    // Avoiding confusing chars: 0, O, I, 1
    let chars: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    (0..6)
        .map(|_| {
            let idx = rng.gen_range(0..chars.len());
            chars[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generate_invite_code_format() {
        for _ in 0..50 {
            let code = generate_invite_code();
            assert!(is_invite_code(&code), "bad code: {}", code);
        }
    }

    #[test]
    fn test_is_invite_code_rejects_ambiguous_chars() {
        assert!(!is_invite_code("ABC10O"));
        assert!(!is_invite_code("abc234"));
        assert!(!is_invite_code("ABCDE"));
        assert!(!is_invite_code("ABCDEFG"));
        assert!(is_invite_code("ABC234"));
    }

    #[test]
    fn test_user_expiry_disabled_yields_none() {
        let spec = UserExpirySpec {
            enabled: false,
            days: 7,
            ..Default::default()
        };
        assert_eq!(spec.total_minutes(), None);
    }

    #[test]
    fn test_user_expiry_consolidation() {
        let spec = UserExpirySpec {
            enabled: true,
            months: 1,
            days: 2,
            hours: 3,
            minutes: 4,
        };
        assert_eq!(
            spec.total_minutes(),
            Some(30 * 24 * 60 + 2 * 24 * 60 + 3 * 60 + 4)
        );
    }

    #[test]
    fn test_user_expiry_enabled_but_zero() {
        let spec = UserExpirySpec {
            enabled: true,
            ..Default::default()
        };
        assert_eq!(spec.total_minutes(), None);
    }

    fn sample_invite() -> Invite {
        Invite {
            id: Uuid::new_v4(),
            code: "ABC234".to_string(),
            label: None,
            user_label: None,
            profile_id: None,
            max_uses: Some(2),
            used_count: 0,
            expires_at: None,
            user_expiry_minutes: None,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_redeemable_use_budget() {
        let now = Utc::now();
        let mut invite = sample_invite();
        assert!(invite.is_redeemable(now));

        invite.used_count = 2;
        assert!(!invite.is_redeemable(now));

        invite.max_uses = None;
        assert!(invite.is_redeemable(now));
    }

    #[test]
    fn test_is_redeemable_expiry_window() {
        let now = Utc::now();
        let mut invite = sample_invite();
        invite.expires_at = Some(now + Duration::hours(1));
        assert!(invite.is_redeemable(now));

        invite.expires_at = Some(now - Duration::seconds(1));
        assert!(!invite.is_redeemable(now));
    }

    #[test]
    fn test_revoked_invite_not_redeemable() {
        let mut invite = sample_invite();
        invite.is_active = false;
        assert!(!invite.is_redeemable(Utc::now()));
    }

    #[test]
    fn test_create_invite_request_validation() {
        let valid = CreateInviteRequest {
            label: Some("friends".to_string()),
            user_label: None,
            profile_id: None,
            max_uses: Some(5),
            expires_in_hours: Some(24),
            expires_at: None,
            user_expiry: None,
        };
        assert!(valid.validate().is_ok());

        let bad_uses = CreateInviteRequest {
            max_uses: Some(0),
            ..valid.clone()
        };
        assert!(bad_uses.validate().is_err());

        let bad_expiry = CreateInviteRequest {
            expires_in_hours: Some(10_000),
            ..valid
        };
        assert!(bad_expiry.validate().is_err());
    }

    #[test]
    fn test_redeem_request_validation() {
        let valid = RedeemInviteRequest {
            username: "newuser".to_string(),
            password: "hunter22".to_string(),
            email: None,
        };
        assert!(valid.validate().is_ok());

        let bad_username = RedeemInviteRequest {
            username: " padded ".to_string(),
            ..valid.clone()
        };
        assert!(bad_username.validate().is_err());

        let bad_email = RedeemInviteRequest {
            email: Some("not-an-email".to_string()),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }
}

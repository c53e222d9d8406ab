//! Account expiry classification.
//!
//! The classification is a pure function of `(expires_at, disabled, now)`.
//! Enforcement (actually disabling an expired account upstream) lives in
//! the api crate; everything here is side-effect free.

use chrono::{DateTime, Duration, Utc};

/// Classification of an account's expiry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// No expiry set and not disabled.
    Permanent,
    /// Explicitly disabled, regardless of expiry.
    Disabled,
    /// Expiry time has passed but the account is not yet disabled.
    Expired,
    /// Active, with the remaining time until expiry.
    ActiveFor(Duration),
}

/// Classifies an account.
///
/// `Permanent` iff `expires_at` is None and the account is not disabled.
/// The disabled flag dominates: a disabled account classifies as
/// `Disabled` even when its expiry has also passed.
pub fn account_status(
    expires_at: Option<DateTime<Utc>>,
    disabled: bool,
    now: DateTime<Utc>,
) -> AccountStatus {
    if disabled {
        return AccountStatus::Disabled;
    }
    match expires_at {
        None => AccountStatus::Permanent,
        Some(at) if now >= at => AccountStatus::Expired,
        Some(at) => AccountStatus::ActiveFor(at - now),
    }
}

impl AccountStatus {
    /// Stable string form for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Permanent => "permanent",
            AccountStatus::Disabled => "disabled",
            AccountStatus::Expired => "expired",
            AccountStatus::ActiveFor(_) => "active",
        }
    }

    /// Remaining minutes until expiry, for active accounts.
    pub fn remaining_minutes(&self) -> Option<i64> {
        match self {
            AccountStatus::ActiveFor(d) => Some(d.num_minutes()),
            _ => None,
        }
    }
}

//! Pure domain logic.

pub mod expiry;
pub mod roles;

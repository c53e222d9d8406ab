//! Application services.

pub mod bootstrap;
pub mod connection;
pub mod expiry;
pub mod jellyfin;
pub mod redemption;

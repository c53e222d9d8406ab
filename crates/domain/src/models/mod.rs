//! Domain model definitions.

pub mod activity;
pub mod app_user;
pub mod invite;
pub mod jellyfin;
pub mod profile;
pub mod role;
pub mod settings;
pub mod user;

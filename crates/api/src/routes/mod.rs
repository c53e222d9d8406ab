//! HTTP route handlers.

pub mod activity;
pub mod auth;
pub mod health;
pub mod invites;
pub mod profiles;
pub mod roles;
pub mod system;
pub mod users;

//! Domain models and pure business logic for the Finboard backend.
//!
//! This crate holds the request/response models for the HTTP API, the
//! Jellyfin wire DTOs, and the small amount of real domain logic the
//! system has: invite codes and expiry arithmetic, account status
//! classification, and role-label derivation from policy flags.

pub mod models;
pub mod services;

//! Shared utilities for the Finboard backend.
//!
//! Common functionality used across the other crates:
//! - Password hashing with Argon2id
//! - Session token generation and hashing
//! - Cursor-based pagination for the activity feed
//! - Common validation logic

pub mod crypto;
pub mod pagination;
pub mod password;
pub mod validation;

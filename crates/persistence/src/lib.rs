//! Persistence layer: Postgres pool, row entities, and repositories.

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

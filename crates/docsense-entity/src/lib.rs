//! Entity models for DocSense.
//!
//! Pure data types mapped to database rows via `sqlx::FromRow`. No I/O or
//! business logic lives here beyond derived predicates over a single row.

pub mod document;
pub mod download;
pub mod role;
pub mod user;

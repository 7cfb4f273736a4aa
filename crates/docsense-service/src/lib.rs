//! Business services for DocSense.
//!
//! Services own the application rules; repositories own the SQL; the API
//! crate owns HTTP. Every operation takes a [`context::RequestContext`]
//! identifying the caller, except the public token download path.

pub mod auth;
pub mod context;
pub mod document;
pub mod download;
pub mod role;
pub mod seed;
pub mod user;

//! Repository implementations.
//!
//! Repositories own all SQL. State transitions are expressed as conditional
//! updates whose affected-row counts the services inspect, so every
//! precondition check is atomic with its mutation.

pub mod document;
pub mod download_request;
pub mod role;
pub mod user;

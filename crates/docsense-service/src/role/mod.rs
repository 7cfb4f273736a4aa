//! Role management service.

pub mod service;

pub use service::{CreateRoleInput, RoleService, RoleWithCount};

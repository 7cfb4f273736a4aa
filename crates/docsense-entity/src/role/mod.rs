//! Role entity.

pub mod model;

pub use model::{CreateRole, Permission, Role, UpdateRole};

/// Name of the administrative role.
pub const SUPERUSER: &str = "superuser";

/// Name of the default role assigned at registration when none is given.
pub const DEFAULT_ROLE: &str = "user";

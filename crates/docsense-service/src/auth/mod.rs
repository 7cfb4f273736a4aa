//! Authentication service.

pub mod service;

pub use service::{AuthService, LoginResult, RegisterInput};

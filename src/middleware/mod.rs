//! Middleware Module
//!
//! Request middleware: authentication (`protect`) and role restriction
//! (`restrict_to`), plus the `CurrentUser` per-request context they attach.

/// Authentication and role-restriction middleware
pub mod auth;

pub use auth::{protect, restrict_to, CurrentUser};

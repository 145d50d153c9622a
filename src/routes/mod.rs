//! Routes Module
//!
//! Pure configuration: maps HTTP verbs and paths onto the controller
//! functions and layers the authentication middleware.

/// Router assembly
pub mod router;

pub use router::create_router;

//! Users Module
//!
//! The user entity: model and named query steps (soft-delete aware),
//! current-user handlers, the photo pipeline, and the admin CRUD wiring.
//!
//! # Module Structure
//!
//! ```text
//! users/
//! ├── mod.rs      - Module exports
//! ├── model.rs    - User/PublicUser, query steps, admin `Resource` impl
//! ├── handlers.rs - /me, /updateMe, /deleteMe
//! └── photo.rs    - photo validation, resize, storage
//! ```

/// User model and database operations
pub mod model;

/// Current-user handlers
pub mod handlers;

/// Profile photo processing
pub mod photo;

pub use model::{PublicUser, Role, User, Users};

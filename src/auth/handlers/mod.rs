//! Authentication Handlers
//!
//! HTTP handlers for the authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs             - Module exports
//! ├── types.rs           - Request types, validation, token response builder
//! ├── signup.rs          - POST /users/signup
//! ├── login.rs           - POST /users/login, GET /users/logout
//! ├── password_reset.rs  - POST /users/forgotPassword, PATCH /users/resetPassword/{token}
//! └── update_password.rs - PATCH /users/updateMyPassword
//! ```

/// Request/response types shared by the auth handlers
pub mod types;

/// User registration
pub mod signup;

/// Login and logout
pub mod login;

/// Forgot/reset password flow
pub mod password_reset;

/// Authenticated password rotation
pub mod update_password;

pub use login::{login, logout};
pub use password_reset::{forgot_password, reset_password};
pub use signup::signup;
pub use update_password::update_password;

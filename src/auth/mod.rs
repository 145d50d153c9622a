//! Authentication Module
//!
//! Password hashing, reset tokens, JWT sessions, and the authentication
//! request handlers (signup, login, logout, password reset flows).
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs       - Module exports
//! ├── password.rs  - bcrypt hashing and reset-token generation
//! ├── sessions.rs  - JWT creation and verification
//! └── handlers/    - HTTP handlers for the auth endpoints
//! ```
//!
//! Route protection itself lives in `middleware::auth`, which verifies the
//! tokens this module issues.

/// Password hashing and reset-token utilities
pub mod password;

/// JWT session token management
pub mod sessions;

/// Authentication request handlers
pub mod handlers;

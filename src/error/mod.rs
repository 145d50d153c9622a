//! Error Module
//!
//! Defines the application error taxonomy and its rendering into HTTP
//! responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports
//! ├── types.rs      - `ApiError` definitions and status mapping
//! └── conversion.rs - `IntoResponse` rendering of the envelope
//! ```
//!
//! Handlers raise a typed `ApiError`; the centralized `IntoResponse`
//! implementation turns it into a `{status, message}` envelope, exposing
//! internal details only in development mode.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use conversion::set_expose_internal;
pub use types::ApiError;

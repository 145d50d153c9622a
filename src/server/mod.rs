//! Server Module
//!
//! Configuration loading, application state, and server initialization.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports
//! ├── config.rs - Environment-driven `Config`
//! ├── state.rs  - `AppState` and `FromRef` extraction
//! └── init.rs   - Pool creation, migrations, app assembly
//! ```

/// Runtime configuration
pub mod config;

/// Application state
pub mod state;

/// Application assembly
pub mod init;

pub use config::Config;
pub use state::AppState;

//! Generic CRUD Factory
//!
//! The parametrized create/read/update/delete/list layer shared by every
//! entity controller.
//!
//! # Module Structure
//!
//! ```text
//! crud/
//! ├── mod.rs     - Module exports
//! ├── query.rs   - Validated filter/sort/project/paginate grammar
//! └── factory.rs - `Resource` trait and generic request handlers
//! ```

/// List-query grammar parsing and SQL compilation
pub mod query;

/// `Resource` trait and generic handlers
pub mod factory;

pub use factory::Resource;
pub use query::{Field, ListQuery};

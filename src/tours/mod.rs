//! Tours Module
//!
//! The tour entity: model, validation, generic CRUD wiring, and the
//! aggregation reports (ratings summary by difficulty, monthly start
//! counts).

/// Tour model and database operations
pub mod model;

/// Alias and aggregation handlers
pub mod handlers;

pub use model::{Tour, Tours};

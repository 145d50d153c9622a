//! Reviews Module
//!
//! The review entity: one record per (user, tour) pair, with the explicit
//! tour-rating recomputation step that keeps the derived aggregate in sync.

/// Review model, database operations, and rating recomputation
pub mod model;

/// Nested review handlers
pub mod handlers;

pub use model::{recalculate_tour_ratings, ReviewDetails, Reviews};

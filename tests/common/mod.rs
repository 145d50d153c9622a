//! Shared test fixtures
//!
//! Each integration suite pulls this in with `mod common;`. The suites
//! need a running PostgreSQL (see `database::create_test_pool` for the
//! connection fallbacks) and are `#[ignore]`d by default; run them with
//! `cargo test -- --ignored` against a disposable database.
#![allow(dead_code)]

pub mod database;
pub mod helpers;

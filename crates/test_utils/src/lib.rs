//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! billing customer sync test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data (users, emails, remote customers)
//! - `builders`: Builder patterns for organizations and remote customers
//! - `database`: Postgres test container with the schema applied
//! - `assertions`: Assertion helpers for sync outcomes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;

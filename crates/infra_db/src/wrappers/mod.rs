//! Foreign data wrapper registration
//!
//! The billing system's customers are exposed inside Postgres as a foreign
//! table backed by the `wrappers` extension. This module holds the settings
//! for that registration and the installer that runs it as the capability
//! probe's steps.

pub mod config;
pub mod installer;

pub use config::{quote_ident, quote_literal, WrappersConfig};
pub use installer::WrappersInstaller;

//! Built-in Adapters for the Customer Domain
//!
//! The remote-backed projection lives in `infra_db`, next to the database
//! machinery it depends on. This module only holds the stand-in selected
//! when the capability probe fails.
//!
//! # Available Adapters
//!
//! - **UnavailableProjection**: fails every call with
//!   `PortError::CapabilityUnavailable`
//! - **Mock adapters**: in-memory ports for testing (re-exported from the
//!   ports module)

pub mod unavailable;

pub use unavailable::UnavailableProjection;

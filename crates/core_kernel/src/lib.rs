//! Core Kernel - Foundational types shared by every crate in the workspace
//!
//! This crate provides the building blocks the domain and infrastructure
//! layers agree on:
//! - Strongly-typed identifiers for organizations and users
//! - The port error type and adapter health primitives
//! - Common error types

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{OrganizationId, UserId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    OperationMetadata,
};

//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL side of the billing customer sync,
//! using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories own the SQL and
//! row types, adapters implement the domain ports on top of them.
//!
//! # Direct Billing Integration
//!
//! The billing system is reached through a foreign data wrapper. The
//! [`WrappersInstaller`] performs the registration steps the capability
//! probe asks for (extension, wrapper, server, schema, foreign table) and
//! hands out a [`ForeignTableCustomerProjection`] that reads and writes the
//! remote customers as rows of the foreign table.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, WrappersConfig, WrappersInstaller};
//! use domain_customer::CapabilityRegistry;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/billing")).await?;
//! let installer = WrappersInstaller::new(pool.clone(), WrappersConfig::default());
//! let snapshot = CapabilityRegistry::new().initialize(&installer).await;
//! ```

pub mod pool;
pub mod error;
pub mod wrappers;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use wrappers::{WrappersConfig, WrappersInstaller};
pub use adapters::{ForeignTableCustomerProjection, PostgresOrganizationAdapter, PostgresUserDirectory};

//! Domain Adapters
//!
//! Implementations of the customer domain's ports on PostgreSQL.
//!
//! - [`PostgresOrganizationAdapter`]: `OrganizationStore` over the
//!   `organizations` table
//! - [`PostgresUserDirectory`]: `UserDirectory` over the `users` table
//! - [`ForeignTableCustomerProjection`]: `CustomerProjection` over the
//!   billing foreign table
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresOrganizationAdapter;
//! use domain_customer::OrganizationStore;
//!
//! let adapter = PostgresOrganizationAdapter::new(pool);
//! let unlinked = adapter.find_unlinked(100).await?;
//! ```

pub mod organization;
pub mod stripe_customers;
pub mod user;

pub use organization::PostgresOrganizationAdapter;
pub use stripe_customers::ForeignTableCustomerProjection;
pub use user::PostgresUserDirectory;

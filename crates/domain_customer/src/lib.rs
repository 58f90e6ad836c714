//! Billing Customer Sync Domain
//!
//! This crate keeps a customer record in the external billing system in step
//! with the organization that owns it. Synchronization is driven by the
//! organization's lifecycle and is strictly best-effort: nothing on the
//! integration path may fail the create or delete of the organization.
//!
//! # Dual-path synchronization
//!
//! At startup the [`CapabilityProbe`] tries to register the direct
//! integration (extension, wrapper handler, server, foreign table). The
//! outcome is frozen into a [`CapabilitySnapshot`] which carries one of two
//! [`CustomerProjection`] implementations:
//!
//! - the remote-backed projection, when every registration step succeeded
//! - [`UnavailableProjection`], which fails every call immediately
//!
//! The synchronizers call the projection uniformly and contain every
//! failure. An organization that ends up without a linked customer is the
//! signal for the out-of-band handler to create one later.
//!
//! # Examples
//!
//! ```rust,ignore
//! use domain_customer::{CapabilityRegistry, OrganizationLifecycle, NewOrganization};
//!
//! let registry = CapabilityRegistry::new();
//! let snapshot = registry.initialize(&installer).await;
//!
//! let lifecycle = OrganizationLifecycle::new(store, &snapshot, users);
//! let created = lifecycle
//!     .create(NewOrganization::new(user_id, "Acme"), None)
//!     .await?;
//!
//! // Linked immediately, or left unset for the async handler
//! println!("{:?}", created.sync);
//! ```

pub mod customer;
pub mod organization;
pub mod error;
pub mod ports;
pub mod capability;
pub mod sync;
pub mod lifecycle;
pub mod policy;
pub mod adapters;

pub use customer::{RemoteCustomer, RemoteCustomerId, NewRemoteCustomer};
pub use organization::{Organization, NewOrganization, LinkState};
pub use error::CustomerError;
pub use ports::{CustomerProjection, UserDirectory, OrganizationStore};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{
    MockCustomerProjection, MockUserDirectory, MockOrganizationStore,
    MockCapabilityInstaller, ProjectionCall,
};
pub use capability::{
    Capability, CapabilityInstaller, CapabilityProbe, CapabilityRegistry,
    CapabilitySnapshot, ProbeReport, ProbeStep, StepOutcome,
};
pub use sync::{
    CreationSynchronizer, DeletionSynchronizer, CreationOutcome, DeletionOutcome,
    SyncFailure,
};
pub use lifecycle::{OrganizationLifecycle, CreatedOrganization};
pub use policy::AccessPolicy;
pub use adapters::UnavailableProjection;

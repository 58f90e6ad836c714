//! Lifecycle synchronizers
//!
//! Both synchronizers run inline, immediately before the organization is
//! written or removed, and both contain every integration failure. Their
//! results are explicit outcome values; neither ever returns an error, so
//! the surrounding lifecycle operation always proceeds.
//!
//! Remote calls are not part of the primary store's transaction. A remote
//! create can succeed and the organization insert still fail afterwards,
//! leaving an orphaned customer on the billing side. That window is
//! accepted; reconciliation belongs to the async handler.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use core_kernel::{PortError, UserId};

use crate::customer::{NewRemoteCustomer, RemoteCustomerId};
use crate::organization::Organization;
use crate::ports::{CustomerProjection, UserDirectory};

/// Why a synchronization did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncFailure {
    /// Direct integration was never established for this process
    #[error("direct integration unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The billing system rejected or could not complete the call
    #[error("remote call failed: {0}")]
    Remote(String),

    /// The customer could not be found again after creation
    #[error("no billing customer found for {email}")]
    CustomerNotFound { email: String },

    /// The create returned no id and there is no email to look it up by
    #[error("owner has no email to resolve the billing customer by")]
    MissingEmail,
}

impl SyncFailure {
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, SyncFailure::CapabilityUnavailable(_))
    }
}

impl From<PortError> for SyncFailure {
    fn from(error: PortError) -> Self {
        if error.is_capability_unavailable() {
            SyncFailure::CapabilityUnavailable(error.to_string())
        } else {
            SyncFailure::Remote(error.to_string())
        }
    }
}

/// Result of the creation synchronizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    /// The organization was linked to a freshly created customer
    Linked(RemoteCustomerId),
    /// The link was left unset for the async handler
    Deferred(SyncFailure),
}

impl CreationOutcome {
    pub fn customer_id(&self) -> Option<&RemoteCustomerId> {
        match self {
            CreationOutcome::Linked(id) => Some(id),
            CreationOutcome::Deferred(_) => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, CreationOutcome::Deferred(_))
    }
}

/// Result of the deletion synchronizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The linked customer was deleted
    Deleted(RemoteCustomerId),
    /// The organization had no link; nothing was called
    Skipped,
    /// The remote delete failed and was discarded
    Failed {
        customer_id: RemoteCustomerId,
        reason: SyncFailure,
    },
}

/// Creates and links the billing customer before an organization is stored
#[derive(Clone)]
pub struct CreationSynchronizer {
    projection: Arc<dyn CustomerProjection>,
    users: Arc<dyn UserDirectory>,
}

impl CreationSynchronizer {
    pub fn new(projection: Arc<dyn CustomerProjection>, users: Arc<dyn UserDirectory>) -> Self {
        Self { projection, users }
    }

    /// Runs against the in-flight organization before it is inserted
    ///
    /// On success the organization's link is set; on any failure it is left
    /// as it was and the failure is returned as a deferred outcome.
    pub async fn before_insert(&self, organization: &mut Organization) -> CreationOutcome {
        let email = self.resolve_email(organization.user_id).await;

        match self.create_and_resolve(email, &organization.name).await {
            Ok(customer_id) => {
                info!(
                    organization_id = %organization.id,
                    customer_id = %customer_id,
                    "Linked organization to billing customer"
                );
                organization.link_customer(customer_id.clone());
                CreationOutcome::Linked(customer_id)
            }
            Err(failure) => {
                warn!(
                    organization_id = %organization.id,
                    error = %failure,
                    "Billing customer creation deferred to async handler"
                );
                CreationOutcome::Deferred(failure)
            }
        }
    }

    /// Looks up the owner's email; a failed lookup counts as no email
    async fn resolve_email(&self, user_id: UserId) -> Option<String> {
        match self.users.email_for(user_id).await {
            Ok(Some(email)) if !email.trim().is_empty() => Some(email),
            Ok(_) => {
                debug!(user_id = %user_id, "Owner has no email on file");
                None
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to resolve owner email");
                None
            }
        }
    }

    /// Creates the customer and works out its id
    ///
    /// The id returned by the create is preferred. When the projection
    /// cannot return one, the latest customer with the same email is used;
    /// another process creating a customer with that email between the two
    /// calls would be picked up instead.
    async fn create_and_resolve(
        &self,
        email: Option<String>,
        name: &str,
    ) -> Result<RemoteCustomerId, SyncFailure> {
        let created = self
            .projection
            .create(NewRemoteCustomer::new(email.clone(), name))
            .await?;

        if let Some(customer_id) = created {
            return Ok(customer_id);
        }

        let email = email.ok_or(SyncFailure::MissingEmail)?;
        let latest = self.projection.find_latest_by_email(&email).await?;
        latest.ok_or(SyncFailure::CustomerNotFound { email })
    }
}

/// Deletes the linked billing customer before an organization is removed
#[derive(Clone)]
pub struct DeletionSynchronizer {
    projection: Arc<dyn CustomerProjection>,
}

impl DeletionSynchronizer {
    pub fn new(projection: Arc<dyn CustomerProjection>) -> Self {
        Self { projection }
    }

    /// Best-effort delete of the linked customer; never retried
    pub async fn before_delete(&self, organization: &Organization) -> DeletionOutcome {
        let Some(customer_id) = organization.stripe_customer_id.clone() else {
            debug!(organization_id = %organization.id, "No billing customer linked; skipping remote delete");
            return DeletionOutcome::Skipped;
        };

        match self.projection.delete(&customer_id).await {
            Ok(()) => {
                info!(
                    organization_id = %organization.id,
                    customer_id = %customer_id,
                    "Deleted billing customer"
                );
                DeletionOutcome::Deleted(customer_id)
            }
            Err(e) => {
                warn!(
                    organization_id = %organization.id,
                    customer_id = %customer_id,
                    error = %e,
                    "Failed to delete billing customer; removing organization anyway"
                );
                DeletionOutcome::Failed {
                    customer_id,
                    reason: e.into(),
                }
            }
        }
    }
}

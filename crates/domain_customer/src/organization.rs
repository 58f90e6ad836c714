//! Organization - the record that owns a billing customer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{OrganizationId, UserId};

use crate::customer::RemoteCustomerId;

/// An application organization that needs a billing counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    /// Owning user; also the only user allowed to read the record
    pub user_id: UserId,
    pub name: String,
    /// Link to the billing customer, unset until a sync succeeds
    pub stripe_customer_id: Option<RemoteCustomerId>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Creates an unlinked organization
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: OrganizationId::new_v7(),
            user_id,
            name: name.into(),
            stripe_customer_id: None,
            created_at: Utc::now(),
        }
    }

    /// Returns the remote-link state of this organization
    pub fn link_state(&self) -> LinkState {
        match &self.stripe_customer_id {
            Some(id) => LinkState::Linked(id.clone()),
            None => LinkState::Unlinked,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.stripe_customer_id.is_some()
    }

    /// Links the organization to a billing customer
    pub fn link_customer(&mut self, customer_id: RemoteCustomerId) {
        self.stripe_customer_id = Some(customer_id);
    }

    /// Returns true if `user_id` owns this organization
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Remote-link state of an organization
///
/// `Unlinked -> Linked` happens on a successful direct create, or later
/// through the async handler. There is no transition back: deleting the
/// organization ends its lifecycle whether or not the remote delete worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Unlinked,
    Linked(RemoteCustomerId),
}

/// Request for creating an organization
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewOrganization {
    pub user_id: UserId,
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

impl NewOrganization {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

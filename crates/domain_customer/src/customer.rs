//! Remote customer entity
//!
//! The billing system owns these records. This crate only ever creates or
//! deletes them through a [`crate::CustomerProjection`] and never mutates
//! one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::CoreError;

/// Identifier assigned by the billing system (e.g. `cus_NffrFeUfNV2Hib`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteCustomerId(String);

impl RemoteCustomerId {
    /// Wraps a billing-system identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses an identifier, rejecting blank input
    pub fn parse(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::validation("remote customer id must not be blank"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw identifier
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RemoteCustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteCustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A customer as seen through the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCustomer {
    pub id: RemoteCustomerId,
    pub email: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Creation time reported by the billing system
    pub created: DateTime<Utc>,
    /// Free-form attributes, opaque to this crate
    #[serde(default)]
    pub attrs: serde_json::Value,
}

impl RemoteCustomer {
    /// Returns true if the customer was registered with the given email
    pub fn has_email(&self, email: &str) -> bool {
        self.email.as_deref() == Some(email)
    }
}

/// Payload for creating a remote customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemoteCustomer {
    pub email: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

impl NewRemoteCustomer {
    pub fn new(email: Option<String>, name: impl Into<String>) -> Self {
        Self {
            email,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Picks the most recently created customer registered with `email`
///
/// Email is not unique on the billing side, so the latest creation wins.
/// Ties go to the customer that appears last.
pub fn latest_by_email<'a, I>(customers: I, email: &str) -> Option<&'a RemoteCustomer>
where
    I: IntoIterator<Item = &'a RemoteCustomer>,
{
    customers
        .into_iter()
        .filter(|c| c.has_email(email))
        .max_by_key(|c| c.created)
}

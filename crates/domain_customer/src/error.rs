//! Customer domain errors
//!
//! Errors here are the ones allowed to reach a caller. Integration failures
//! on the billing side never become a `CustomerError`; they are contained by
//! the synchronizers and reported as [`crate::SyncFailure`] instead.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the customer domain
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Organization with the given ID was not found
    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    /// Caller is not allowed to read the organization
    #[error("Access denied: {user_id} may not read organization {organization_id}")]
    AccessDenied {
        user_id: String,
        organization_id: String,
    },

    /// Organization validation failed
    #[error("Organization validation failed: {0}")]
    ValidationFailed(String),

    /// The primary store rejected the operation
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl CustomerError {
    /// Creates an OrganizationNotFound error from any ID type
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        CustomerError::OrganizationNotFound(id.to_string())
    }

    /// Creates an AccessDenied error
    pub fn access_denied(
        user_id: impl std::fmt::Display,
        organization_id: impl std::fmt::Display,
    ) -> Self {
        CustomerError::AccessDenied {
            user_id: user_id.to_string(),
            organization_id: organization_id.to_string(),
        }
    }

    /// Returns true if the error means the organization does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            CustomerError::OrganizationNotFound(_) => true,
            CustomerError::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for CustomerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CustomerError::ValidationFailed(errors.to_string())
    }
}

//! Read access policy for organizations
//!
//! A caller may read an organization's synchronization fields only when the
//! caller is the organization's owning user. Writes are not covered here;
//! they only happen through the synchronizers. The same rule is installed
//! as a row-level security policy on the `organizations` table.

use core_kernel::UserId;

use crate::error::CustomerError;
use crate::organization::Organization;

/// Owner-only read policy
pub struct AccessPolicy;

impl AccessPolicy {
    /// Returns true if `caller` may read `organization`
    pub fn can_read(caller: UserId, organization: &Organization) -> bool {
        organization.is_owned_by(caller)
    }

    /// Like [`AccessPolicy::can_read`], as a `Result` for `?` chains
    pub fn authorize_read(caller: UserId, organization: &Organization) -> Result<(), CustomerError> {
        if Self::can_read(caller, organization) {
            Ok(())
        } else {
            Err(CustomerError::access_denied(caller, organization.id))
        }
    }
}

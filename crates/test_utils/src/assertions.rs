//! Custom Test Assertions
//!
//! Assertion helpers for sync outcomes with messages that say what the
//! organization and the billing side actually looked like.

use domain_customer::{CreationOutcome, DeletionOutcome, Organization, RemoteCustomerId, SyncFailure};

/// Asserts that creation linked the organization to `expected`
///
/// # Panics
///
/// Panics if the outcome is deferred, names another id, or the organization
/// does not carry the same link
pub fn assert_linked(organization: &Organization, outcome: &CreationOutcome, expected: &RemoteCustomerId) {
    assert_eq!(
        outcome,
        &CreationOutcome::Linked(expected.clone()),
        "Expected organization {} to be linked to {}, outcome was {:?}",
        organization.id,
        expected,
        outcome
    );
    assert_eq!(
        organization.stripe_customer_id.as_ref(),
        Some(expected),
        "Outcome says linked but organization {} carries {:?}",
        organization.id,
        organization.stripe_customer_id
    );
}

/// Asserts that creation was deferred and left the link unset
///
/// Returns the failure for further inspection.
pub fn assert_deferred<'a>(organization: &Organization, outcome: &'a CreationOutcome) -> &'a SyncFailure {
    assert!(
        organization.stripe_customer_id.is_none(),
        "Deferred organization {} must stay unlinked, found {:?}",
        organization.id,
        organization.stripe_customer_id
    );
    match outcome {
        CreationOutcome::Deferred(failure) => failure,
        CreationOutcome::Linked(id) => panic!(
            "Expected deferred creation for organization {}, got link to {}",
            organization.id, id
        ),
    }
}

/// Asserts that deletion made no remote call
pub fn assert_skipped(outcome: &DeletionOutcome) {
    assert_eq!(
        outcome,
        &DeletionOutcome::Skipped,
        "Expected deletion to skip the billing side, got {:?}",
        outcome
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::UserId;

    #[test]
    fn test_assert_linked_passes() {
        let mut org = Organization::new(UserId::new(), "Acme");
        let id = RemoteCustomerId::new("cus_1");
        org.link_customer(id.clone());

        assert_linked(&org, &CreationOutcome::Linked(id.clone()), &id);
    }

    #[test]
    #[should_panic(expected = "must stay unlinked")]
    fn test_assert_deferred_rejects_linked_organization() {
        let mut org = Organization::new(UserId::new(), "Acme");
        org.link_customer(RemoteCustomerId::new("cus_1"));

        assert_deferred(&org, &CreationOutcome::Deferred(SyncFailure::MissingEmail));
    }

    #[test]
    fn test_assert_deferred_returns_failure() {
        let org = Organization::new(UserId::new(), "Acme");
        let outcome = CreationOutcome::Deferred(SyncFailure::MissingEmail);

        assert_eq!(assert_deferred(&org, &outcome), &SyncFailure::MissingEmail);
    }
}

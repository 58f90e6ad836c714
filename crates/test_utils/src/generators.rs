//! Property-Based Test Generators
//!
//! Proptest strategies for inputs and for the behavior of the billing side.

use proptest::prelude::*;

use domain_customer::{MockCustomerProjection, ProbeStep};

/// How the billing side behaves during a generated test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteBehavior {
    /// Whether `create` reports the new id
    pub returns_created_id: bool,
    pub fail_create: bool,
    pub fail_lookup: bool,
    pub fail_delete: bool,
}

impl RemoteBehavior {
    /// Builds a mock projection behaving as described
    pub fn projection(&self) -> MockCustomerProjection {
        let mut projection = if self.returns_created_id {
            MockCustomerProjection::new()
        } else {
            MockCustomerProjection::without_created_id()
        };
        if self.fail_create {
            projection = projection.failing_create("generated create failure");
        }
        if self.fail_lookup {
            projection = projection.failing_lookup("generated lookup failure");
        }
        if self.fail_delete {
            projection = projection.failing_delete("generated delete failure");
        }
        projection
    }

    /// Whether a create under this behavior can end up linked
    pub fn can_link(&self) -> bool {
        !self.fail_create && (self.returns_created_id || !self.fail_lookup)
    }
}

/// Strategy for arbitrary billing-side behavior
pub fn remote_behavior_strategy() -> impl Strategy<Value = RemoteBehavior> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(returns_created_id, fail_create, fail_lookup, fail_delete)| RemoteBehavior {
            returns_created_id,
            fail_create,
            fail_lookup,
            fail_delete,
        },
    )
}

/// Strategy for the probe step that fails, if any
pub fn failing_probe_step_strategy() -> impl Strategy<Value = Option<ProbeStep>> {
    prop_oneof![
        Just(None),
        proptest::sample::select(ProbeStep::ALL.to_vec()).prop_map(Some),
    ]
}

/// Strategy for valid organization names
pub fn organization_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 &.,-]{0,60}"
}

/// Strategy for owner emails, including none
pub fn owner_email_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        "[a-z]{1,12}@[a-z]{1,10}\\.(com|io|dev)".prop_map(Some),
    ]
}

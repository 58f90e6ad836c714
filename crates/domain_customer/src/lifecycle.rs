//! Organization lifecycle
//!
//! Wires the synchronizers around the organization store so they run as
//! part of create and delete, the way before-insert and before-delete
//! triggers would. The only error either operation can return comes from
//! the store itself; the billing side never fails them.

use std::sync::Arc;
use tracing::info;
use validator::Validate;

use core_kernel::{OperationMetadata, OrganizationId, PortError, UserId};

use crate::capability::CapabilitySnapshot;
use crate::error::CustomerError;
use crate::organization::{NewOrganization, Organization};
use crate::policy::AccessPolicy;
use crate::ports::{OrganizationStore, UserDirectory};
use crate::sync::{CreationOutcome, CreationSynchronizer, DeletionOutcome, DeletionSynchronizer};

/// A stored organization together with how its billing sync went
#[derive(Debug, Clone)]
pub struct CreatedOrganization {
    pub organization: Organization,
    pub sync: CreationOutcome,
}

/// Create/read/delete for organizations with billing sync attached
#[derive(Clone)]
pub struct OrganizationLifecycle {
    store: Arc<dyn OrganizationStore>,
    creation: CreationSynchronizer,
    deletion: DeletionSynchronizer,
}

impl OrganizationLifecycle {
    /// Builds the lifecycle on top of the projection chosen by the probe
    pub fn new(
        store: Arc<dyn OrganizationStore>,
        snapshot: &CapabilitySnapshot,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let projection = snapshot.projection();
        Self {
            store,
            creation: CreationSynchronizer::new(Arc::clone(&projection), users),
            deletion: DeletionSynchronizer::new(projection),
        }
    }

    /// Creates an organization, linking a billing customer when possible
    pub async fn create(
        &self,
        request: NewOrganization,
        metadata: Option<OperationMetadata>,
    ) -> Result<CreatedOrganization, CustomerError> {
        request.validate()?;

        let mut organization = Organization::new(request.user_id, request.name);
        let sync = self.creation.before_insert(&mut organization).await;
        self.store.insert(&organization).await?;

        info!(
            organization_id = %organization.id,
            correlation_id = correlation_id(&metadata),
            linked = organization.is_linked(),
            "Organization created"
        );

        Ok(CreatedOrganization { organization, sync })
    }

    /// Retrieves an organization without any access check
    pub async fn get(&self, id: OrganizationId) -> Result<Organization, CustomerError> {
        self.store.get(id).await.map_err(|e| not_found_or_store(id, e))
    }

    /// Retrieves an organization on behalf of `caller`
    pub async fn get_for(&self, caller: UserId, id: OrganizationId) -> Result<Organization, CustomerError> {
        let organization = self.get(id).await?;
        AccessPolicy::authorize_read(caller, &organization)?;
        Ok(organization)
    }

    /// Deletes an organization, removing its billing customer on a best-effort basis
    pub async fn delete(
        &self,
        id: OrganizationId,
        metadata: Option<OperationMetadata>,
    ) -> Result<DeletionOutcome, CustomerError> {
        let organization = self.get(id).await?;
        let outcome = self.deletion.before_delete(&organization).await;
        self.store.delete(id).await.map_err(|e| not_found_or_store(id, e))?;

        info!(
            organization_id = %id,
            correlation_id = correlation_id(&metadata),
            "Organization deleted"
        );

        Ok(outcome)
    }

    /// Deletes an organization on behalf of `caller`, who must be able to read it
    pub async fn delete_for(
        &self,
        caller: UserId,
        id: OrganizationId,
        metadata: Option<OperationMetadata>,
    ) -> Result<DeletionOutcome, CustomerError> {
        self.get_for(caller, id).await?;
        self.delete(id, metadata).await
    }
}

fn correlation_id(metadata: &Option<OperationMetadata>) -> &str {
    metadata
        .as_ref()
        .and_then(|m| m.correlation_id.as_deref())
        .unwrap_or("-")
}

fn not_found_or_store(id: OrganizationId, error: PortError) -> CustomerError {
    if error.is_not_found() {
        CustomerError::not_found(id)
    } else {
        CustomerError::Store(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityProbe, ProbeStep};
    use crate::customer::RemoteCustomerId;
    use crate::ports::mock::{
        MockCapabilityInstaller, MockCustomerProjection, MockOrganizationStore, MockUserDirectory,
    };
    use proptest::prelude::*;

    struct Harness {
        lifecycle: OrganizationLifecycle,
        store: Arc<MockOrganizationStore>,
        projection: Arc<MockCustomerProjection>,
        owner: UserId,
    }

    async fn harness(projection: MockCustomerProjection, failing: Option<ProbeStep>) -> Harness {
        let owner = UserId::new();
        let projection = Arc::new(projection);
        let mut installer = MockCapabilityInstaller::new(projection.clone());
        if let Some(step) = failing {
            installer = installer.failing_step(step);
        }
        let snapshot = CapabilityProbe::run(&installer).await;

        let store = Arc::new(MockOrganizationStore::new());
        let users = Arc::new(MockUserDirectory::new().with_user(owner, "a@x.com").await);

        Harness {
            lifecycle: OrganizationLifecycle::new(store.clone(), &snapshot, users),
            store,
            projection,
            owner,
        }
    }

    #[tokio::test]
    async fn test_available_capability_links_customer() {
        let h = harness(MockCustomerProjection::without_created_id(), None).await;

        let created = h
            .lifecycle
            .create(NewOrganization::new(h.owner, "Acme"), None)
            .await
            .unwrap();

        assert_eq!(created.sync, CreationOutcome::Linked(RemoteCustomerId::new("cus_1")));
        let stored = h.store.get(created.organization.id).await.unwrap();
        assert_eq!(stored.stripe_customer_id, Some(RemoteCustomerId::new("cus_1")));
    }

    #[tokio::test]
    async fn test_unavailable_capability_still_creates() {
        let h = harness(MockCustomerProjection::new(), Some(ProbeStep::EnableExtension)).await;

        let created = h
            .lifecycle
            .create(NewOrganization::new(h.owner, "Acme"), None)
            .await
            .unwrap();

        assert!(created.sync.is_deferred());
        let stored = h.store.get(created.organization.id).await.unwrap();
        assert!(stored.stripe_customer_id.is_none());
        assert!(h.projection.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_transient_remote_error_still_creates() {
        let h = harness(MockCustomerProjection::new().failing_create("connection reset by peer"), None).await;

        let created = h
            .lifecycle
            .create(NewOrganization::new(h.owner, "Acme"), None)
            .await
            .unwrap();

        assert!(created.sync.is_deferred());
        assert!(h.store.contains(created.organization.id).await);
        assert!(!created.organization.is_linked());
    }

    #[tokio::test]
    async fn test_failed_remote_delete_still_deletes() {
        let h = harness(MockCustomerProjection::new().failing_delete("billing outage"), None).await;

        let created = h
            .lifecycle
            .create(NewOrganization::new(h.owner, "Acme"), None)
            .await
            .unwrap();
        assert_eq!(created.sync.customer_id(), Some(&RemoteCustomerId::new("cus_1")));

        let outcome = h.lifecycle.delete(created.organization.id, None).await.unwrap();

        assert!(matches!(outcome, DeletionOutcome::Failed { .. }));
        assert!(!h.store.contains(created.organization.id).await);
    }

    #[tokio::test]
    async fn test_unlinked_delete_skips_remote() {
        let h = harness(MockCustomerProjection::new().failing_create("declined"), None).await;

        let created = h
            .lifecycle
            .create(NewOrganization::new(h.owner, "Acme"), None)
            .await
            .unwrap();
        let calls_before = h.projection.calls().await.len();

        let outcome = h.lifecycle.delete(created.organization.id, None).await.unwrap();

        assert_eq!(outcome, DeletionOutcome::Skipped);
        assert!(!h.projection.delete_attempted().await);
        assert_eq!(h.projection.calls().await.len(), calls_before);
        assert!(!h.store.contains(created.organization.id).await);
    }

    #[tokio::test]
    async fn test_delete_with_unavailable_capability() {
        let h = harness(MockCustomerProjection::new(), Some(ProbeStep::RegisterProjection)).await;

        let mut organization = Organization::new(h.owner, "Acme");
        organization.link_customer(RemoteCustomerId::new("cus_77"));
        h.store.insert(&organization).await.unwrap();

        let outcome = h.lifecycle.delete(organization.id, None).await.unwrap();

        match outcome {
            DeletionOutcome::Failed { reason, .. } => assert!(reason.is_capability_unavailable()),
            other => panic!("expected failed outcome, got {:?}", other),
        }
        assert!(!h.store.contains(organization.id).await);
    }

    #[tokio::test]
    async fn test_store_failure_is_the_only_create_error() {
        let owner = UserId::new();
        let projection = Arc::new(MockCustomerProjection::new());
        let snapshot = CapabilityProbe::run(&MockCapabilityInstaller::new(projection)).await;
        let lifecycle = OrganizationLifecycle::new(
            Arc::new(MockOrganizationStore::new().failing_insert("duplicate key")),
            &snapshot,
            Arc::new(MockUserDirectory::new()),
        );

        let result = lifecycle.create(NewOrganization::new(owner, "Acme"), None).await;
        assert!(matches!(result, Err(CustomerError::Store(PortError::Conflict { .. }))));
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_sync() {
        let h = harness(MockCustomerProjection::new(), None).await;

        let result = h.lifecycle.create(NewOrganization::new(h.owner, ""), None).await;

        assert!(matches!(result, Err(CustomerError::ValidationFailed(_))));
        assert!(h.projection.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_for_enforces_access_policy() {
        let h = harness(MockCustomerProjection::new(), None).await;
        let created = h
            .lifecycle
            .create(NewOrganization::new(h.owner, "Acme"), None)
            .await
            .unwrap();
        let id = created.organization.id;

        assert!(h.lifecycle.get_for(h.owner, id).await.is_ok());
        assert!(matches!(
            h.lifecycle.get_for(UserId::new(), id).await,
            Err(CustomerError::AccessDenied { .. })
        ));
        assert!(matches!(
            h.lifecycle.delete_for(UserId::new(), id, None).await,
            Err(CustomerError::AccessDenied { .. })
        ));
        assert!(h.store.contains(id).await);
    }

    #[tokio::test]
    async fn test_missing_organization() {
        let h = harness(MockCustomerProjection::new(), None).await;
        let result = h.lifecycle.delete(OrganizationId::new(), None).await;
        assert!(result.unwrap_err().is_not_found());
    }

    fn probe_step() -> impl Strategy<Value = Option<ProbeStep>> {
        prop_oneof![
            Just(None),
            proptest::sample::select(ProbeStep::ALL.to_vec()).prop_map(Some),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_create_and_delete_never_fail(
            failing in probe_step(),
            fail_create in any::<bool>(),
            fail_lookup in any::<bool>(),
            fail_delete in any::<bool>(),
            returns_id in any::<bool>(),
            name in "[A-Za-z][A-Za-z0-9 ]{0,40}",
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let mut projection = if returns_id {
                    MockCustomerProjection::new()
                } else {
                    MockCustomerProjection::without_created_id()
                };
                if fail_create {
                    projection = projection.failing_create("create failed");
                }
                if fail_lookup {
                    projection = projection.failing_lookup("lookup failed");
                }
                if fail_delete {
                    projection = projection.failing_delete("delete failed");
                }

                let h = harness(projection, failing).await;
                let created = h
                    .lifecycle
                    .create(NewOrganization::new(h.owner, name.clone()), None)
                    .await
                    .unwrap();

                let stored = h.store.get(created.organization.id).await.unwrap();
                assert_eq!(stored.stripe_customer_id.as_ref(), created.sync.customer_id());

                let outcome = h.lifecycle.delete(created.organization.id, None).await.unwrap();
                if !stored.is_linked() {
                    assert_eq!(outcome, DeletionOutcome::Skipped);
                }
                assert!(!h.store.contains(created.organization.id).await);
            });
        }
    }
}

//! Customer Domain Ports
//!
//! This module defines the port interfaces the customer sync domain needs
//! from the outside world.
//!
//! # Architecture
//!
//! - **CustomerProjection**: the linked entity mapping onto the billing
//!   system's customers. Implemented by the foreign-table adapter
//!   (infra_db) when the capability probe succeeds, and by
//!   [`crate::UnavailableProjection`] when it does not.
//! - **UserDirectory**: read-only access to the owning user's email.
//! - **OrganizationStore**: persistence for the owning record itself.
//! - **Mock adapters**: in-memory implementations for tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_customer::ports::CustomerProjection;
//! use std::sync::Arc;
//!
//! let projection: Arc<dyn CustomerProjection> = snapshot.projection();
//! let created = projection
//!     .create(NewRemoteCustomer::new(Some("a@x.com".into()), "Acme"))
//!     .await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, OrganizationId, PortError, UserId};

use crate::customer::{NewRemoteCustomer, RemoteCustomer, RemoteCustomerId};
use crate::organization::Organization;

/// Passthrough projection of the billing system's customer entity
///
/// Every call goes straight to the remote system: no caching and no local
/// persistence. Implementations must not retry or impose timeouts of their
/// own; that is the remote-call layer's business.
#[async_trait]
pub trait CustomerProjection: DomainPort + HealthCheckable {
    /// Creates one remote customer
    ///
    /// Returns the new id when the backend reports it. Backends that cannot
    /// return it (e.g. a foreign table insert) return `None`, and callers
    /// fall back to [`CustomerProjection::find_latest_by_email`].
    async fn create(&self, customer: NewRemoteCustomer) -> Result<Option<RemoteCustomerId>, PortError>;

    /// Finds the most recently created customer with the given email
    async fn find_latest_by_email(&self, email: &str) -> Result<Option<RemoteCustomerId>, PortError>;

    /// Reads a customer by id
    async fn get(&self, id: &RemoteCustomerId) -> Result<RemoteCustomer, PortError>;

    /// Deletes a customer by id
    async fn delete(&self, id: &RemoteCustomerId) -> Result<(), PortError>;
}

/// Read-only lookup of user data owned by the identity system
#[async_trait]
pub trait UserDirectory: DomainPort {
    /// Returns the user's email, or `None` if the user has none or does not exist
    async fn email_for(&self, user_id: UserId) -> Result<Option<String>, PortError>;
}

/// Persistence port for organizations
///
/// `find_unlinked` and `set_customer_id` are the surface the out-of-band
/// handler uses to complete deferred synchronizations.
#[async_trait]
pub trait OrganizationStore: DomainPort {
    /// Persists a new organization, including its link field as given
    async fn insert(&self, organization: &Organization) -> Result<(), PortError>;

    /// Retrieves an organization by ID
    async fn get(&self, id: OrganizationId) -> Result<Organization, PortError>;

    /// Removes an organization
    async fn delete(&self, id: OrganizationId) -> Result<(), PortError>;

    /// Lists organizations still waiting for a billing customer, oldest first
    async fn find_unlinked(&self, limit: u32) -> Result<Vec<Organization>, PortError>;

    /// Records the billing customer created for an organization
    ///
    /// Only fills an unset link; an already linked organization yields
    /// `PortError::Conflict`.
    async fn set_customer_id(
        &self,
        id: OrganizationId,
        customer_id: &RemoteCustomerId,
    ) -> Result<(), PortError>;
}

/// Mock implementations of the domain ports for testing
///
/// These adapters keep everything in memory and are useful for unit testing
/// without a database or a billing account.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::capability::{CapabilityInstaller, ProbeStep};
    use crate::customer::latest_by_email;

    /// A call observed by [`MockCustomerProjection`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProjectionCall {
        Create { email: Option<String>, name: String },
        FindLatestByEmail(String),
        Get(RemoteCustomerId),
        Delete(RemoteCustomerId),
    }

    /// In-memory mock of the billing customer projection
    ///
    /// Ids are handed out as `cus_1`, `cus_2`, ... in creation order.
    #[derive(Debug, Default)]
    pub struct MockCustomerProjection {
        customers: Arc<RwLock<Vec<RemoteCustomer>>>,
        calls: Arc<RwLock<Vec<ProjectionCall>>>,
        next_id: AtomicU64,
        returns_created_id: bool,
        fail_create: Option<String>,
        fail_lookup: Option<String>,
        fail_delete: Option<String>,
    }

    impl MockCustomerProjection {
        /// Creates a mock whose `create` reports the new id
        pub fn new() -> Self {
            Self {
                returns_created_id: true,
                ..Default::default()
            }
        }

        /// Creates a mock that behaves like a foreign table: `create`
        /// returns no id, forcing a lookup by email
        pub fn without_created_id() -> Self {
            Self::default()
        }

        /// Makes every `create` fail with the given message
        pub fn failing_create(mut self, message: impl Into<String>) -> Self {
            self.fail_create = Some(message.into());
            self
        }

        /// Makes every `find_latest_by_email` fail with the given message
        pub fn failing_lookup(mut self, message: impl Into<String>) -> Self {
            self.fail_lookup = Some(message.into());
            self
        }

        /// Makes every `delete` fail with the given message
        pub fn failing_delete(mut self, message: impl Into<String>) -> Self {
            self.fail_delete = Some(message.into());
            self
        }

        /// Pre-populates the remote side with customers
        pub async fn with_customers(self, customers: Vec<RemoteCustomer>) -> Self {
            self.customers.write().await.extend(customers);
            self
        }

        /// Returns every call made so far, in order
        pub async fn calls(&self) -> Vec<ProjectionCall> {
            self.calls.read().await.clone()
        }

        /// Returns the customers currently held on the remote side
        pub async fn customers(&self) -> Vec<RemoteCustomer> {
            self.customers.read().await.clone()
        }

        /// Returns true if `delete` was called at least once
        pub async fn delete_attempted(&self) -> bool {
            self.calls
                .read()
                .await
                .iter()
                .any(|c| matches!(c, ProjectionCall::Delete(_)))
        }

        async fn record(&self, call: ProjectionCall) {
            self.calls.write().await.push(call);
        }
    }

    impl DomainPort for MockCustomerProjection {}

    #[async_trait]
    impl HealthCheckable for MockCustomerProjection {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-customer-projection".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CustomerProjection for MockCustomerProjection {
        async fn create(&self, customer: NewRemoteCustomer) -> Result<Option<RemoteCustomerId>, PortError> {
            self.record(ProjectionCall::Create {
                email: customer.email.clone(),
                name: customer.name.clone(),
            })
            .await;

            if let Some(ref message) = self.fail_create {
                return Err(PortError::remote(message.clone()));
            }

            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let id = RemoteCustomerId::new(format!("cus_{}", n));
            self.customers.write().await.push(RemoteCustomer {
                id: id.clone(),
                email: customer.email,
                name: Some(customer.name),
                description: customer.description,
                created: Utc::now(),
                attrs: serde_json::Value::Null,
            });

            Ok(self.returns_created_id.then_some(id))
        }

        async fn find_latest_by_email(&self, email: &str) -> Result<Option<RemoteCustomerId>, PortError> {
            self.record(ProjectionCall::FindLatestByEmail(email.to_string())).await;

            if let Some(ref message) = self.fail_lookup {
                return Err(PortError::remote(message.clone()));
            }

            let customers = self.customers.read().await;
            Ok(latest_by_email(customers.iter(), email).map(|c| c.id.clone()))
        }

        async fn get(&self, id: &RemoteCustomerId) -> Result<RemoteCustomer, PortError> {
            self.record(ProjectionCall::Get(id.clone())).await;

            self.customers
                .read()
                .await
                .iter()
                .find(|c| &c.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn delete(&self, id: &RemoteCustomerId) -> Result<(), PortError> {
            self.record(ProjectionCall::Delete(id.clone())).await;

            if let Some(ref message) = self.fail_delete {
                return Err(PortError::remote(message.clone()));
            }

            let mut customers = self.customers.write().await;
            let before = customers.len();
            customers.retain(|c| &c.id != id);
            if customers.len() == before {
                return Err(PortError::not_found("Customer", id));
            }
            Ok(())
        }
    }

    /// In-memory user directory
    #[derive(Debug, Default)]
    pub struct MockUserDirectory {
        emails: Arc<RwLock<HashMap<UserId, Option<String>>>>,
        fail_with: Option<String>,
    }

    impl MockUserDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a directory whose every lookup fails
        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                fail_with: Some(message.into()),
                ..Default::default()
            }
        }

        /// Registers a user with an email
        pub async fn with_user(self, user_id: UserId, email: impl Into<String>) -> Self {
            self.emails.write().await.insert(user_id, Some(email.into()));
            self
        }

        /// Registers a user who has no email on file
        pub async fn with_user_without_email(self, user_id: UserId) -> Self {
            self.emails.write().await.insert(user_id, None);
            self
        }
    }

    impl DomainPort for MockUserDirectory {}

    #[async_trait]
    impl UserDirectory for MockUserDirectory {
        async fn email_for(&self, user_id: UserId) -> Result<Option<String>, PortError> {
            if let Some(ref message) = self.fail_with {
                return Err(PortError::connection(message.clone()));
            }
            Ok(self.emails.read().await.get(&user_id).cloned().flatten())
        }
    }

    /// In-memory organization store
    #[derive(Debug, Default)]
    pub struct MockOrganizationStore {
        organizations: Arc<RwLock<HashMap<OrganizationId, Organization>>>,
        fail_insert: Option<String>,
    }

    impl MockOrganizationStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every insert fail, e.g. to emulate a constraint violation
        pub fn failing_insert(mut self, message: impl Into<String>) -> Self {
            self.fail_insert = Some(message.into());
            self
        }

        /// Returns true if the organization is currently stored
        pub async fn contains(&self, id: OrganizationId) -> bool {
            self.organizations.read().await.contains_key(&id)
        }

        pub async fn len(&self) -> usize {
            self.organizations.read().await.len()
        }
    }

    impl DomainPort for MockOrganizationStore {}

    #[async_trait]
    impl HealthCheckable for MockOrganizationStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-organization-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: None,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl OrganizationStore for MockOrganizationStore {
        async fn insert(&self, organization: &Organization) -> Result<(), PortError> {
            if let Some(ref message) = self.fail_insert {
                return Err(PortError::Conflict { message: message.clone() });
            }
            let mut organizations = self.organizations.write().await;
            if organizations.contains_key(&organization.id) {
                return Err(PortError::Conflict {
                    message: format!("organization {} already exists", organization.id),
                });
            }
            organizations.insert(organization.id, organization.clone());
            Ok(())
        }

        async fn get(&self, id: OrganizationId) -> Result<Organization, PortError> {
            self.organizations
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Organization", id))
        }

        async fn delete(&self, id: OrganizationId) -> Result<(), PortError> {
            self.organizations
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Organization", id))
        }

        async fn find_unlinked(&self, limit: u32) -> Result<Vec<Organization>, PortError> {
            let organizations = self.organizations.read().await;
            let mut unlinked: Vec<_> = organizations
                .values()
                .filter(|o| !o.is_linked())
                .cloned()
                .collect();
            unlinked.sort_by_key(|o| o.created_at);
            unlinked.truncate(limit as usize);
            Ok(unlinked)
        }

        async fn set_customer_id(
            &self,
            id: OrganizationId,
            customer_id: &RemoteCustomerId,
        ) -> Result<(), PortError> {
            let mut organizations = self.organizations.write().await;
            let organization = organizations
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Organization", id))?;
            if organization.is_linked() {
                return Err(PortError::Conflict {
                    message: format!("organization {} is already linked", id),
                });
            }
            organization.link_customer(customer_id.clone());
            Ok(())
        }
    }

    /// Scriptable capability installer
    ///
    /// Registering the projection fails whenever an earlier registration
    /// step failed, mirroring a foreign table that has no server to bind to.
    pub struct MockCapabilityInstaller {
        failing: HashSet<ProbeStep>,
        attempts: Arc<RwLock<Vec<ProbeStep>>>,
        projection: Arc<dyn CustomerProjection>,
    }

    impl MockCapabilityInstaller {
        /// Creates an installer where every step succeeds
        pub fn new(projection: Arc<dyn CustomerProjection>) -> Self {
            Self {
                failing: HashSet::new(),
                attempts: Arc::new(RwLock::new(Vec::new())),
                projection,
            }
        }

        /// Makes the given step fail
        pub fn failing_step(mut self, step: ProbeStep) -> Self {
            self.failing.insert(step);
            self
        }

        /// Returns the steps attempted so far, in order
        pub async fn attempts(&self) -> Vec<ProbeStep> {
            self.attempts.read().await.clone()
        }

        async fn attempt(&self, step: ProbeStep) -> Result<(), PortError> {
            self.attempts.write().await.push(step);
            if self.failing.contains(&step) {
                return Err(PortError::internal(format!("{} failed", step)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CapabilityInstaller for MockCapabilityInstaller {
        async fn enable_extension(&self) -> Result<(), PortError> {
            self.attempt(ProbeStep::EnableExtension).await
        }

        async fn register_handler(&self) -> Result<(), PortError> {
            self.attempt(ProbeStep::RegisterHandler).await
        }

        async fn register_server(&self) -> Result<(), PortError> {
            self.attempt(ProbeStep::RegisterServer).await
        }

        async fn ensure_schema(&self) -> Result<(), PortError> {
            self.attempt(ProbeStep::EnsureSchema).await
        }

        async fn register_projection(&self) -> Result<(), PortError> {
            let upstream_failed = [
                ProbeStep::EnableExtension,
                ProbeStep::RegisterHandler,
                ProbeStep::RegisterServer,
            ]
            .iter()
            .any(|step| self.failing.contains(step));

            self.attempt(ProbeStep::RegisterProjection).await?;
            if upstream_failed {
                return Err(PortError::internal("server \"stripe_server\" does not exist"));
            }
            Ok(())
        }

        fn projection(&self) -> Arc<dyn CustomerProjection> {
            Arc::clone(&self.projection)
        }
    }
}

//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use chrono::{DateTime, Utc};

use core_kernel::{OrganizationId, UserId};
use domain_customer::{NewOrganization, Organization, RemoteCustomer, RemoteCustomerId};

use crate::fixtures::{IdFixtures, TemporalFixtures, UserFixtures};

/// Builder for organizations
pub struct TestOrganizationBuilder {
    id: OrganizationId,
    user_id: UserId,
    name: String,
    stripe_customer_id: Option<RemoteCustomerId>,
    created_at: DateTime<Utc>,
}

impl Default for TestOrganizationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestOrganizationBuilder {
    /// Creates an unlinked organization owned by a fresh user
    pub fn new() -> Self {
        Self {
            id: IdFixtures::organization_id(),
            user_id: IdFixtures::user_id(),
            name: "Acme".to_string(),
            stripe_customer_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: OrganizationId) -> Self {
        self.id = id;
        self
    }

    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Uses a fake company name
    pub fn with_fake_name(mut self) -> Self {
        self.name = UserFixtures::fake_organization_name();
        self
    }

    /// Links the organization to a billing customer
    pub fn linked_to(mut self, customer_id: impl Into<RemoteCustomerId>) -> Self {
        self.stripe_customer_id = Some(customer_id.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn build(self) -> Organization {
        Organization {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            stripe_customer_id: self.stripe_customer_id,
            created_at: self.created_at,
        }
    }

    /// Builds the create request for the same owner and name
    pub fn build_request(self) -> NewOrganization {
        NewOrganization::new(self.user_id, self.name)
    }
}

/// Builder for customers on the billing side
pub struct TestRemoteCustomerBuilder {
    id: RemoteCustomerId,
    email: Option<String>,
    name: Option<String>,
    created: DateTime<Utc>,
}

impl Default for TestRemoteCustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRemoteCustomerBuilder {
    pub fn new() -> Self {
        Self {
            id: IdFixtures::random_remote_customer_id(),
            email: Some(UserFixtures::owner_email().to_string()),
            name: Some("Acme".to_string()),
            created: TemporalFixtures::earlier(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RemoteCustomerId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    pub fn build(self) -> RemoteCustomer {
        RemoteCustomer {
            id: self.id,
            email: self.email,
            name: self.name,
            description: None,
            created: self.created,
            attrs: serde_json::Value::Null,
        }
    }
}

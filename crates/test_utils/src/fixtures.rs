//! Pre-built Test Fixtures
//!
//! Ready-to-use test data. Fixed values where a test needs to assert on
//! them, `fake` values where it only needs something plausible.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;

use core_kernel::{OrganizationId, UserId};
use domain_customer::{MockUserDirectory, RemoteCustomerId};

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn user_id() -> UserId {
        UserId::new()
    }

    pub fn organization_id() -> OrganizationId {
        OrganizationId::new_v7()
    }

    /// A billing id in the format the billing system hands out
    pub fn remote_customer_id() -> RemoteCustomerId {
        RemoteCustomerId::new("cus_NffrFeUfNV2Hib")
    }

    /// A distinct, random-looking billing id
    pub fn random_remote_customer_id() -> RemoteCustomerId {
        let suffix: String = uuid::Uuid::new_v4().simple().to_string();
        RemoteCustomerId::new(format!("cus_{}", &suffix[..14]))
    }
}

/// Fixture for user contact data
pub struct UserFixtures;

impl UserFixtures {
    /// Email of the default owner
    pub fn owner_email() -> &'static str {
        "a@x.com"
    }

    pub fn fake_email() -> String {
        SafeEmail().fake()
    }

    pub fn fake_organization_name() -> String {
        CompanyName().fake()
    }

    /// A directory holding one user with [`UserFixtures::owner_email`]
    pub async fn directory_with_owner(owner: UserId) -> MockUserDirectory {
        MockUserDirectory::new()
            .with_user(owner, Self::owner_email())
            .await
    }
}

/// Fixture for timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Creation time of the older of two customers sharing an email
    pub fn earlier() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// Creation time of the newer of two customers sharing an email
    pub fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }
}

//! Organization DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_customer::{CreatedOrganization, CreationOutcome, Organization};

/// Body of `POST /api/v1/organizations`; the owner is the caller
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(organization: Organization) -> Self {
        Self {
            id: *organization.id.as_uuid(),
            user_id: *organization.user_id.as_uuid(),
            name: organization.name,
            stripe_customer_id: organization.stripe_customer_id.map(|id| id.into_inner()),
            created_at: organization.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Linked,
    Deferred,
}

/// How the billing sync went during creation
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<CreationOutcome> for SyncResponse {
    fn from(outcome: CreationOutcome) -> Self {
        match outcome {
            CreationOutcome::Linked(id) => Self {
                status: SyncStatus::Linked,
                customer_id: Some(id.into_inner()),
                reason: None,
            },
            CreationOutcome::Deferred(failure) => Self {
                status: SyncStatus::Deferred,
                customer_id: None,
                reason: Some(failure.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrganizationResponse {
    pub organization: OrganizationResponse,
    pub sync: SyncResponse,
}

impl From<CreatedOrganization> for CreateOrganizationResponse {
    fn from(created: CreatedOrganization) -> Self {
        Self {
            organization: created.organization.into(),
            sync: created.sync.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::UserId;
    use domain_customer::{RemoteCustomerId, SyncFailure};

    #[test]
    fn test_deferred_sync_serialization() {
        let sync = SyncResponse::from(CreationOutcome::Deferred(SyncFailure::MissingEmail));
        let json = serde_json::to_value(&sync).unwrap();

        assert_eq!(json["status"], "deferred");
        assert!(json.get("customer_id").is_none());
        assert!(json["reason"].as_str().unwrap().contains("email"));
    }

    #[test]
    fn test_linked_response() {
        let mut organization = Organization::new(UserId::new(), "Acme");
        organization.link_customer(RemoteCustomerId::new("cus_1"));
        let created = CreatedOrganization {
            organization,
            sync: CreationOutcome::Linked(RemoteCustomerId::new("cus_1")),
        };

        let json = serde_json::to_value(CreateOrganizationResponse::from(created)).unwrap();
        assert_eq!(json["organization"]["stripe_customer_id"], "cus_1");
        assert_eq!(json["sync"]["status"], "linked");
        assert_eq!(json["sync"]["customer_id"], "cus_1");
    }
}

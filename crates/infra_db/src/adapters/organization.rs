//! PostgreSQL Organization Adapter
//!
//! Implements the `OrganizationStore` port on top of
//! [`OrganizationRepository`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::PostgresOrganizationAdapter;
//! use domain_customer::OrganizationStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn OrganizationStore> = Arc::new(PostgresOrganizationAdapter::new(pool));
//! let organization = store.get(organization_id).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OrganizationId, PortError, UserId,
};
use domain_customer::{Organization, OrganizationStore, RemoteCustomerId};

use crate::repositories::organization::{OrganizationRepository, OrganizationRow};

/// PostgreSQL-backed implementation of the OrganizationStore port
///
/// Database errors are translated to `PortError` through
/// `From<DatabaseError>`; a missing row becomes `PortError::NotFound`.
#[derive(Debug, Clone)]
pub struct PostgresOrganizationAdapter {
    repository: OrganizationRepository,
    pool: PgPool,
}

impl PostgresOrganizationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OrganizationRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresOrganizationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresOrganizationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;
        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: "postgres-organization-adapter".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl OrganizationStore for PostgresOrganizationAdapter {
    #[instrument(skip(self, organization), fields(organization_id = %organization.id))]
    async fn insert(&self, organization: &Organization) -> Result<(), PortError> {
        debug!(linked = organization.is_linked(), "Inserting organization");
        self.repository.insert(&organization_to_row(organization)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(organization_id = %id))]
    async fn get(&self, id: OrganizationId) -> Result<Organization, PortError> {
        let row = self.repository.get_by_id(*id.as_uuid()).await?;
        Ok(row_to_organization(row))
    }

    #[instrument(skip(self), fields(organization_id = %id))]
    async fn delete(&self, id: OrganizationId) -> Result<(), PortError> {
        self.repository.delete(*id.as_uuid()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_unlinked(&self, limit: u32) -> Result<Vec<Organization>, PortError> {
        let rows = self.repository.find_unlinked(i64::from(limit)).await?;
        Ok(rows.into_iter().map(row_to_organization).collect())
    }

    #[instrument(skip(self, customer_id), fields(organization_id = %id))]
    async fn set_customer_id(
        &self,
        id: OrganizationId,
        customer_id: &RemoteCustomerId,
    ) -> Result<(), PortError> {
        if self.repository.set_customer_id(*id.as_uuid(), customer_id.as_str()).await? {
            return Ok(());
        }
        Err(PortError::Conflict {
            message: format!("organization {} is already linked", id),
        })
    }
}

fn organization_to_row(organization: &Organization) -> OrganizationRow {
    OrganizationRow {
        id: *organization.id.as_uuid(),
        user_id: *organization.user_id.as_uuid(),
        name: organization.name.clone(),
        stripe_customer_id: organization
            .stripe_customer_id
            .as_ref()
            .map(|id| id.as_str().to_string()),
        created_at: organization.created_at,
    }
}

fn row_to_organization(row: OrganizationRow) -> Organization {
    Organization {
        id: OrganizationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        name: row.name,
        stripe_customer_id: row.stripe_customer_id.map(RemoteCustomerId::new),
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_keeps_link() {
        let mut organization = Organization::new(UserId::new(), "Acme");
        organization.link_customer(RemoteCustomerId::new("cus_1"));

        let row = organization_to_row(&organization);
        assert_eq!(row.stripe_customer_id.as_deref(), Some("cus_1"));
        assert_eq!(row_to_organization(row), organization);
    }

    #[test]
    fn test_row_conversion_unlinked() {
        let organization = Organization::new(UserId::new(), "Acme");
        let row = organization_to_row(&organization);

        assert!(row.stripe_customer_id.is_none());
        assert!(!row_to_organization(row).is_linked());
    }
}

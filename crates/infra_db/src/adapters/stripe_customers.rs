//! Foreign-table customer projection
//!
//! Reads and writes billing customers as rows of the foreign table the
//! [`crate::WrappersInstaller`] registered. Every statement is forwarded by
//! the wrapper to the billing API, so nothing here is cached and nothing is
//! retried.
//!
//! The wrapper does not return generated columns from an `INSERT`, so
//! [`CustomerProjection::create`] always reports `None` and callers look the
//! new customer up by email.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_customer::{CustomerProjection, NewRemoteCustomer, RemoteCustomer, RemoteCustomerId};

use crate::error::DatabaseError;
use crate::wrappers::config::WrappersConfig;

/// Customer projection over the billing foreign table
#[derive(Debug, Clone)]
pub struct ForeignTableCustomerProjection {
    pool: PgPool,
    config: WrappersConfig,
}

impl ForeignTableCustomerProjection {
    pub fn new(pool: PgPool, config: WrappersConfig) -> Self {
        Self { pool, config }
    }

    fn table(&self) -> Result<String, PortError> {
        Ok(self.config.qualified_table()?)
    }
}

/// Errors raised while the wrapper talks to the billing API come back as
/// ordinary database errors; anything that is not a local connection
/// problem is reported as a remote failure.
fn remote_error(error: sqlx::Error) -> PortError {
    match DatabaseError::from(&error) {
        e if e.is_connection_error() => e.into(),
        DatabaseError::ForeignDataWrapper(message)
        | DatabaseError::QueryFailed(message)
        | DatabaseError::UndefinedObject(message) => PortError::remote(message),
        e => e.into(),
    }
}

impl DomainPort for ForeignTableCustomerProjection {}

#[async_trait]
impl HealthCheckable for ForeignTableCustomerProjection {
    /// Checks that the foreign table is registered
    ///
    /// Does not call the billing API.
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = match self.table() {
            Ok(table) => sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
                .bind(table)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        let (status, message) = match result {
            Ok(true) => (AdapterHealth::Healthy, None),
            Ok(false) => (
                AdapterHealth::Unhealthy,
                Some("billing customer foreign table is missing".to_string()),
            ),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: "foreign-table-customer-projection".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl CustomerProjection for ForeignTableCustomerProjection {
    #[instrument(skip(self, customer), fields(name = %customer.name))]
    async fn create(&self, customer: NewRemoteCustomer) -> Result<Option<RemoteCustomerId>, PortError> {
        let sql = format!(
            "INSERT INTO {} (email, name, description) VALUES ($1, $2, $3)",
            self.table()?
        );

        sqlx::query(&sql)
            .bind(customer.email)
            .bind(customer.name)
            .bind(customer.description)
            .execute(&self.pool)
            .await
            .map_err(remote_error)?;

        debug!("Billing customer created");
        Ok(None)
    }

    #[instrument(skip(self, email))]
    async fn find_latest_by_email(&self, email: &str) -> Result<Option<RemoteCustomerId>, PortError> {
        let sql = latest_by_email_sql(&self.table()?);

        let id = sqlx::query_scalar::<_, String>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(remote_error)?;

        debug!(found = id.is_some(), "Looked up billing customer by email");
        Ok(id.map(RemoteCustomerId::new))
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get(&self, id: &RemoteCustomerId) -> Result<RemoteCustomer, PortError> {
        let sql = format!(
            "SELECT id, email, name, description, created, attrs FROM {} WHERE id = $1",
            self.table()?
        );

        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(remote_error)?
            .ok_or_else(|| PortError::not_found("Customer", id))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn delete(&self, id: &RemoteCustomerId) -> Result<(), PortError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table()?);

        let result = sqlx::query(&sql)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(remote_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Customer", id));
        }
        debug!("Billing customer deleted");
        Ok(())
    }
}

/// Newest customer for an email; rows without `created` rank oldest,
/// matching [`domain_customer::customer::latest_by_email`]
fn latest_by_email_sql(table: &str) -> String {
    format!(
        "SELECT id FROM {} WHERE email = $1 ORDER BY created DESC NULLS LAST LIMIT 1",
        table
    )
}

/// Row of the foreign table
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    email: Option<String>,
    name: Option<String>,
    description: Option<String>,
    created: Option<NaiveDateTime>,
    attrs: Option<serde_json::Value>,
}

impl From<CustomerRow> for RemoteCustomer {
    fn from(row: CustomerRow) -> Self {
        RemoteCustomer {
            id: RemoteCustomerId::new(row.id),
            email: row.email,
            name: row.name,
            description: row.description,
            // The wrapper exposes `created` as a UTC timestamp without zone
            created: row
                .created
                .map(|t| t.and_utc())
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            attrs: row.attrs.unwrap_or(serde_json::Value::Null),
        }
    }
}

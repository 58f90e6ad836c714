//! Capability installer backed by the `wrappers` extension
//!
//! Each probe step is one idempotent DDL statement against the primary
//! database. Failures are returned as-is; the probe decides what they mean.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};

use core_kernel::PortError;
use domain_customer::{CapabilityInstaller, CustomerProjection};

use crate::adapters::ForeignTableCustomerProjection;
use crate::error::DatabaseError;
use crate::wrappers::config::WrappersConfig;

/// Registers the billing foreign table in the primary database
#[derive(Debug, Clone)]
pub struct WrappersInstaller {
    pool: PgPool,
    config: WrappersConfig,
}

impl WrappersInstaller {
    pub fn new(pool: PgPool, config: WrappersConfig) -> Self {
        Self { pool, config }
    }

    async fn execute(&self, ddl: Result<String, DatabaseError>) -> Result<(), PortError> {
        let ddl = ddl?;
        debug!(statement = %ddl, "Executing wrapper DDL");
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))?;
        Ok(())
    }

    async fn wrapper_exists(&self) -> Result<bool, PortError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_foreign_data_wrapper WHERE fdwname = $1)",
        )
        .bind(&self.config.wrapper)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
        Ok(exists)
    }
}

#[async_trait]
impl CapabilityInstaller for WrappersInstaller {
    #[instrument(skip(self), fields(extension = %self.config.extension))]
    async fn enable_extension(&self) -> Result<(), PortError> {
        self.execute(self.config.extension_schema_ddl()).await?;
        self.execute(self.config.extension_ddl()).await
    }

    #[instrument(skip(self), fields(wrapper = %self.config.wrapper))]
    async fn register_handler(&self) -> Result<(), PortError> {
        if self.wrapper_exists().await? {
            debug!("Foreign data wrapper already registered");
            return Ok(());
        }
        self.execute(self.config.wrapper_ddl()).await
    }

    #[instrument(skip(self), fields(server = %self.config.server))]
    async fn register_server(&self) -> Result<(), PortError> {
        self.execute(self.config.server_ddl()).await
    }

    #[instrument(skip(self), fields(schema = %self.config.schema))]
    async fn ensure_schema(&self) -> Result<(), PortError> {
        self.execute(self.config.schema_ddl()).await
    }

    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn register_projection(&self) -> Result<(), PortError> {
        self.execute(self.config.projection_ddl()).await
    }

    fn projection(&self) -> Arc<dyn CustomerProjection> {
        Arc::new(ForeignTableCustomerProjection::new(
            self.pool.clone(),
            self.config.clone(),
        ))
    }
}

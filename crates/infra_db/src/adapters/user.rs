//! PostgreSQL user directory

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, PortError, UserId};
use domain_customer::UserDirectory;

use crate::repositories::user::UserRepository;

/// Reads owner emails from the `users` table
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    repository: UserRepository,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresUserDirectory {}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn email_for(&self, user_id: UserId) -> Result<Option<String>, PortError> {
        Ok(self.repository.email_for(*user_id.as_uuid()).await?)
    }
}

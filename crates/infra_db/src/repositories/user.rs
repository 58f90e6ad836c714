//! User repository
//!
//! Read-only: users belong to the identity system, this crate only needs
//! their email.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the user's email; `None` for a missing user or a null email
    pub async fn email_for(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        let email = sqlx::query_scalar::<_, Option<String>>("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))?;

        Ok(email.flatten())
    }
}

//! Organization repository implementation
//!
//! Plain row access for the `organizations` table. The billing link is an
//! ordinary nullable column written together with the rest of the row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const COLUMNS: &str = "id, user_id, name, stripe_customer_id, created_at";

/// Repository for the `organizations` table
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new organization row, link column included
    pub async fn insert(&self, row: &OrganizationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, user_id, name, stripe_customer_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.name)
        .bind(&row.stripe_customer_id)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }

    /// Retrieves an organization by its identifier
    pub async fn get_by_id(&self, id: Uuid) -> Result<OrganizationRow, DatabaseError> {
        let sql = format!("SELECT {} FROM organizations WHERE id = $1", COLUMNS);
        sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))?
            .ok_or_else(|| DatabaseError::not_found("Organization", id))
    }

    /// Deletes an organization
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Organization", id));
        }
        Ok(())
    }

    /// Lists organizations without a billing link, oldest first
    pub async fn find_unlinked(&self, limit: i64) -> Result<Vec<OrganizationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM organizations WHERE stripe_customer_id IS NULL \
             ORDER BY created_at ASC LIMIT $1",
            COLUMNS
        );
        sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))
    }

    /// Sets the billing link if it is still unset
    ///
    /// Returns `false` when the organization exists but is already linked.
    pub async fn set_customer_id(&self, id: Uuid, customer_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET stripe_customer_id = $2
            WHERE id = $1 AND stripe_customer_id IS NULL
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish "already linked" from "no such organization"
        self.get_by_id(id).await.map(|_| false)
    }
}

/// Row in the `organizations` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

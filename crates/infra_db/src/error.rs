//! Database error types
//!
//! Errors raised by the repositories and the wrappers installer, plus the
//! translation into [`PortError`] used at the adapter boundary.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The role lacks a privilege, e.g. to create an extension
    #[error("Insufficient privilege: {0}")]
    InsufficientPrivilege(String),

    /// A referenced object (extension, function, server, table) does not exist
    #[error("Undefined object: {0}")]
    UndefinedObject(String),

    /// An identifier that would be spliced into DDL is not a plain name
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// A required setting was left empty
    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    /// The foreign data wrapper surfaced an error from the remote system
    #[error("Foreign data wrapper error: {0}")]
    ForeignDataWrapper(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Organization", "ORG-123");
    /// assert!(error.to_string().contains("Organization"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Maps SQLx errors onto specific variants by PostgreSQL error code
///
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::QueryFailed("no rows returned".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(message),
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23514") => DatabaseError::ConstraintViolation(message),
                    Some("42501") => DatabaseError::InsufficientPrivilege(message),
                    Some("42704") | Some("42883") | Some("42P01") | Some("58P01") => {
                        DatabaseError::UndefinedObject(message)
                    }
                    // Class HV: foreign data wrapper errors
                    Some(code) if code.starts_with("HV") => DatabaseError::ForeignDataWrapper(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

/// Translates database errors into port errors
///
/// - `NotFound` -> `PortError::NotFound`
/// - constraint violations -> `PortError::Conflict`
/// - connection failures -> `PortError::Connection`
/// - wrapper errors -> `PortError::Remote`
/// - everything else -> `PortError::Internal`
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound {
                entity_type: entity,
                id,
            },
            e if e.is_constraint_violation() => PortError::Conflict {
                message: e.to_string(),
            },
            e if e.is_connection_error() => PortError::Connection {
                message: e.to_string(),
                source: Some(Box::new(e)),
            },
            DatabaseError::ForeignDataWrapper(message) => PortError::Remote { message },
            e => PortError::Internal {
                message: e.to_string(),
                source: Some(Box::new(e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_port_not_found() {
        let port: PortError = DatabaseError::not_found("Organization", "ORG-1").into();
        assert!(port.is_not_found());
        assert!(port.to_string().contains("ORG-1"));
    }

    #[test]
    fn test_constraint_violation_maps_to_conflict() {
        let port: PortError = DatabaseError::DuplicateEntry("organizations_pkey".into()).into();
        assert!(matches!(port, PortError::Conflict { .. }));
    }

    #[test]
    fn test_connection_error_is_transient() {
        let port: PortError = DatabaseError::PoolExhausted.into();
        assert!(port.is_transient());
    }

    #[test]
    fn test_wrapper_error_maps_to_remote() {
        let port: PortError = DatabaseError::ForeignDataWrapper("No such customer".into()).into();
        assert!(matches!(port, PortError::Remote { ref message } if message == "No such customer"));
    }

    #[test]
    fn test_row_not_found_is_not_an_entity_miss() {
        let err = DatabaseError::from(&sqlx::Error::RowNotFound);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err = DatabaseError::from(&sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatabaseError::PoolExhausted));
        assert!(err.is_connection_error());
    }
}

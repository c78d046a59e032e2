//! Database error types
//!
//! Postgres failures are classified by SQLSTATE so that the settlement
//! services can tell a uniqueness race (`23505`) from a broken connection.

use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// SQLSTATE 23505
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// SQLSTATE 23503
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// SQLSTATE 23514
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Invoice", 42);
    /// assert_eq!(error.to_string(), "Invoice 42 not found");
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DatabaseError::DuplicateEntry(_))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::not_found("Record", "requested"),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(message),
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23514") => DatabaseError::CheckViolation(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(&error)
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

/// Duplicates become `Conflict`, which drives the code-generator retry and
/// the settle re-read.
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound {
                entity_type: entity,
                id,
            },
            DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
            other if other.is_connection_error() => PortError::Connection {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let db = DatabaseError::DuplicateEntry("invoices_booking_id_key".into());
        assert!(db.is_duplicate());

        let port: PortError = db.into();
        assert!(port.is_conflict());
    }

    #[test]
    fn test_pool_exhaustion_is_transient() {
        let port: PortError = DatabaseError::PoolExhausted.into();
        assert!(port.is_transient());
    }

    #[test]
    fn test_not_found_keeps_entity() {
        let port = PortError::from(DatabaseError::not_found("Booking", 9));
        match port {
            PortError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Booking");
                assert_eq!(id, "9");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_row_not_found() {
        assert!(DatabaseError::from(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn test_other_failures_are_internal() {
        let port: PortError = DatabaseError::CheckViolation("invoices_commission_check".into()).into();
        assert!(!port.is_transient());
        assert!(matches!(port, PortError::Internal { .. }));
    }
}

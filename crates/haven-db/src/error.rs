//! Database-specific error types and conversions.

use haven_core::error::HavenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid stored data: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<DbError> for HavenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HavenError::NotFound { entity, id },
            DbError::Validation(message) => HavenError::Validation { message },
            other => HavenError::Database(other.to_string()),
        }
    }
}

//! Error types for the HAVEN system.

use thiserror::Error;

use crate::access::{Action, ResourceType};

#[derive(Debug, Error)]
pub enum HavenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// The caller is correctly identified but not permitted.
    ///
    /// The message is deliberately generic: it never reveals whether the
    /// resource exists.
    #[error("{message}")]
    Authorization { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HavenError {
    /// The standard permission-denied error for an action on a resource
    /// type.
    pub fn permission_denied(action: Action, resource_type: ResourceType) -> Self {
        HavenError::Authorization {
            message: format!("You don't have permission to {action} this {resource_type}"),
        }
    }
}

pub type HavenResult<T> = Result<T, HavenError>;

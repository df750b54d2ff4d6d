/// Error taxonomy for the task and user repositories
///
/// Every repository operation returns [`RepositoryResult`]. The variants are
/// terminal for the request that produced them; nothing in this crate retries.
///
/// # Variants
///
/// - `Validation`: a required field is blank or out of range (checked before any write)
/// - `NotFound`: the targeted record does not exist
/// - `Forbidden`: the targeted record belongs to a different user
/// - `StoreUnavailable`: the persistence layer could not complete the call
///
/// # Example
///
/// ```
/// use taskboard_shared::error::{FieldError, RepositoryError};
///
/// let err = RepositoryError::Validation(vec![FieldError::new("title", "Title must not be blank")]);
/// assert_eq!(err.to_string(), "Validation failed: 1 field error(s)");
/// ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Repository result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    /// Creates a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the store (pool exhausted, connection refused, ...)
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed a query
    #[error("Store query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Connection(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Errors surfaced by the task repository and user directory
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Input failed validation; nothing was written
    #[error("Validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("task", "user")
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Record exists but is owned by another user
    #[error("Not allowed to modify this {entity}")]
    Forbidden {
        /// Entity kind
        entity: &'static str,
    },

    /// Persistence layer failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl RepositoryError {
    /// Shorthand for a missing task
    pub fn task_not_found(id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: "task",
            id: id.to_string(),
        }
    }

    /// Shorthand for a single-field validation failure
    pub fn invalid(field: &str, message: &str) -> Self {
        RepositoryError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<validator::ValidationErrors> for RepositoryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        RepositoryError::Validation(details)
    }
}

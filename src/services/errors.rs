use thiserror::Error;

use crate::repository::errors::RepositoryError;

/// Failures reported by use-case functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller lacks the role required by the operation.
    #[error("insufficient rights")]
    Unauthorized,

    #[error("entity not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Storage failed; details are logged, not returned.
    #[error("storage error")]
    Storage,

    #[error("internal error")]
    Internal,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Stable machine-readable code used in error bodies.
    pub const fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized => "forbidden",
            ServiceError::NotFound => "not_found",
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Storage => "storage_error",
            ServiceError::Internal => "internal_error",
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ConstraintViolation(message) => ServiceError::Conflict(message),
            RepositoryError::ValidationError(message) => ServiceError::Validation(message),
            other => {
                log::error!("Storage failure: {other}");
                ServiceError::Storage
            }
        }
    }
}

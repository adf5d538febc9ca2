//! Conversions from lower-layer errors into service and repository errors.
//!
//! Kept outside the domain and engine modules so those stay free of
//! service/repository types.

use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::filter::FilterError;
use crate::pagination::PaginationError;
use crate::repository::errors::RepositoryError;
use crate::services::errors::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<FilterError> for ServiceError {
    fn from(val: FilterError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<PaginationError> for ServiceError {
    fn from(val: PaginationError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(val: ValidationErrors) -> Self {
        let mut fields: Vec<_> = val.field_errors().into_keys().map(|f| f.to_string()).collect();
        fields.sort();
        ServiceError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

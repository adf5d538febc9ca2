//! HTTP handlers and the mapping of service errors onto responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, error, web};
use serde::Serialize;

use crate::services::ServiceError;

pub mod access_overrides;
pub mod patients;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub message: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Storage | ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.code(),
            message: self.to_string(),
        })
    }
}

impl From<error::BlockingError> for ServiceError {
    fn from(err: error::BlockingError) -> Self {
        log::error!("Blocking task failed: {err}");
        ServiceError::Internal
    }
}

/// JSON extractor settings: unreadable bodies are reported as validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into())
}

/// Registers every API route under the current scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(patients::search_patients)
        .service(patients::create_patient)
        .service(patients::show_patient)
        .service(access_overrides::search_overrides)
        .service(access_overrides::create_override)
        .service(access_overrides::show_override)
        .service(access_overrides::review_override);
}

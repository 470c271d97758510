//! # HTTP Errors
//!
//! Maps resource failures onto status codes and a JSON error body.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::resource::ResourceError;
use crate::schema::FieldError;

/// Result type for HTTP handlers
pub type HttpResult<T> = Result<T, HttpError>;

/// Transport-level errors
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Failure reported by the resource façade
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// No resource is mounted under that name
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Body is not a JSON document
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl HttpError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::Resource(err) => match err {
                ResourceError::Validation(_)
                | ResourceError::MissingId
                | ResourceError::Query(_) => StatusCode::BAD_REQUEST,
                ResourceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ResourceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HttpError::UnknownResource(_) => StatusCode::NOT_FOUND,
            HttpError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, FieldError>>,
}

impl From<HttpError> for ErrorResponse {
    fn from(err: HttpError) -> Self {
        let status = err.status_code().as_u16();
        let message = err.to_string();
        let errors = match err {
            HttpError::Resource(ResourceError::Validation(v)) => Some(v.errors),
            _ => None,
        };
        Self {
            status,
            message,
            errors,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::StoreError;
    use crate::schema::ValidationErrors;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HttpError::from(ResourceError::MissingId).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError::UnknownResource("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(ResourceError::from(StoreError::Poisoned("store"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("order", FieldError::InvalidNumber);
        let body = ErrorResponse::from(HttpError::from(ResourceError::from(errors)));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["errors"]["order"], "invalid number");
    }

    #[test]
    fn test_other_errors_omit_field_map() {
        let body = ErrorResponse::from(HttpError::from(ResourceError::MissingId));
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["message"], "You must include an id");
    }
}

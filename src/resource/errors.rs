//! # Resource Errors
//!
//! `ResourceError` separates "malformed request" (missing id) from
//! "invalid data" (field errors) so transports can branch on them.

use thiserror::Error;

use crate::query::QueryError;
use crate::schema::ValidationErrors;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Storage collaborator failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A lock guarding shared state was poisoned by a panic
    #[error("Storage lock poisoned: {0}")]
    Poisoned(&'static str),

    /// `replace` targeted an id that is not stored
    #[error("No stored document with id '{0}'")]
    Missing(String),
}

/// Errors returned by the resource façade
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// One or more fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// update / delete called without an identifier
    #[error("You must include an id")]
    MissingId,

    /// update targeted an id that does not exist
    #[error("No {resource} with id '{id}'")]
    NotFound { resource: String, id: String },

    /// Query object could not be parsed
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Storage collaborator failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResourceError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ResourceError::Validation(_) => "RESOURCE_VALIDATION_FAILED",
            ResourceError::MissingId => "RESOURCE_MISSING_ID",
            ResourceError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ResourceError::Query(e) => e.code(),
            ResourceError::Store(_) => "RESOURCE_STORE_FAILED",
        }
    }

    /// Field errors, when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ResourceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

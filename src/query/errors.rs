//! # Query Errors
//!
//! Error types for query parsing.

use thiserror::Error;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Malformed query objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// `q` parameter is not valid JSON
    #[error("Query is not valid JSON: {0}")]
    InvalidJson(String),

    /// Query (or a nested clause) must be an object
    #[error("{0} must be an object")]
    NotAnObject(String),

    /// Sort direction other than 1 / -1
    #[error("Invalid sort direction for '{field}': expected 1 or -1")]
    InvalidSortDirection { field: String },

    /// `$skip` / `$limit` not a non-negative integer
    #[error("{0} must be a non-negative integer")]
    InvalidCount(String),

    /// Unrecognised `$` key
    #[error("Unknown query operator: {0}")]
    UnknownOperator(String),

    /// Operand cannot be used with the operator or field type
    #[error("Invalid operand for '{field}': {reason}")]
    InvalidOperand { field: String, reason: String },

    /// `$regex` pattern does not compile
    #[error("Invalid regex for '{field}': {reason}")]
    InvalidRegex { field: String, reason: String },

    /// `$fields` mixes includes and excludes
    #[error("$fields cannot mix included and excluded fields")]
    MixedProjection,
}

impl QueryError {
    pub fn invalid_operand(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidOperand {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidJson(_) => "QUERY_INVALID_JSON",
            QueryError::NotAnObject(_) => "QUERY_NOT_AN_OBJECT",
            QueryError::InvalidSortDirection { .. } => "QUERY_INVALID_SORT",
            QueryError::InvalidCount(_) => "QUERY_INVALID_COUNT",
            QueryError::UnknownOperator(_) => "QUERY_UNKNOWN_OPERATOR",
            QueryError::InvalidOperand { .. } => "QUERY_INVALID_OPERAND",
            QueryError::InvalidRegex { .. } => "QUERY_INVALID_REGEX",
            QueryError::MixedProjection => "QUERY_MIXED_PROJECTION",
        }
    }
}

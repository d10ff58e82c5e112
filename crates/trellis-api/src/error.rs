//! Request error taxonomy.
//!
//! Exactly one error value comes back per failed request. The boundary
//! layer uses [`ApiError::kind`] to choose an HTTP status; the core never
//! recovers from an error and continues the same request.

use crate::store::StoreError;
use trellis_validate::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Field-scoped failures; always a set, even when only one field fails.
    /// Never reaches persistence. Rendered sorted by field name.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The supplied identity does not correspond to an existing row.
    #[error("no such {0}")]
    NotFound(String),

    /// The store rejected the operation. Always triggers rollback; never
    /// retried by the core.
    #[error("{0}")]
    Persistence(#[from] StoreError),

    /// Caller contract violation, e.g. Delete without an identity. Fatal to
    /// the request.
    #[error("{0}")]
    Programming(String),
}

impl ApiError {
    pub fn programming(msg: impl Into<String>) -> Self {
        ApiError::Programming(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    /// Classification hint for the boundary layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Persistence(_) => ErrorKind::Persistence,
            ApiError::Programming(_) => ErrorKind::Programming,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Persistence,
    Programming,
}

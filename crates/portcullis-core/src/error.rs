//! Error types for portcullis-core

use thiserror::Error;

use crate::field::ErrorList;

/// Result type for portcullis operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by strategies and the request pipeline
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// One or more field validations failed; blocks persistence
    #[error("{kind} \"{name}\" is invalid: {errors}")]
    Invalid {
        kind: String,
        name: String,
        errors: ErrorList,
    },

    /// A hook received an object of a different kind than it governs
    #[error("expected an object of kind {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    /// Non-fatal server-side failure (e.g. host allocation)
    #[error("Internal error occurred: {0}")]
    Internal(String),

    /// The target object does not exist
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    /// Optimistic-concurrency precondition failed
    #[error("Operation cannot be fulfilled on {kind} \"{name}\": {message}")]
    Conflict {
        kind: String,
        name: String,
        message: String,
    },

    /// Malformed request (e.g. namespace mismatch)
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Build an `Invalid` error from a non-empty error list
    pub fn invalid(kind: impl Into<String>, name: impl Into<String>, errors: ErrorList) -> Self {
        Self::Invalid {
            kind: kind.into(),
            name: name.into(),
            errors,
        }
    }

    /// Build an `Internal` error from anything displayable
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// Check if this is a validation failure
    pub fn is_invalid(&self) -> bool {
        matches!(self, ApiError::Invalid { .. })
    }

    /// Check if this is an optimistic-concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Field errors carried by an `Invalid` error
    pub fn field_errors(&self) -> Option<&ErrorList> {
        match self {
            ApiError::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldError, Path};

    #[test]
    fn test_invalid_error_display() {
        let errors: ErrorList = vec![FieldError::required(
            Path::new("spec").child("to").child("name"),
            "",
        )]
        .into();
        let err = ApiError::invalid("Route", "frontend", errors);
        insta::assert_snapshot!(err.to_string(), @r#"Route "frontend" is invalid: spec.to.name: Required value"#);
        assert!(err.is_invalid());
        assert_eq!(err.field_errors().map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = ApiError::TypeMismatch {
            expected: "Route".to_string(),
            found: "BuildConfig".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "expected an object of kind Route, got BuildConfig"
        );
        assert!(!err.is_invalid());
    }

    #[test]
    fn test_conflict_predicates() {
        let err = ApiError::Conflict {
            kind: "Route".to_string(),
            name: "r".to_string(),
            message: "stale".to_string(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }
}

//! CLI error types with exit code handling

use miette::Diagnostic;
use portcullis_core::ApiError;
use thiserror::Error;

use crate::exit_codes;

/// CLI error carrying its exit code
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// The strategy rejected the object
    #[error("Validation failed: {message}")]
    #[diagnostic(code(portcullis::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Optimistic-concurrency precondition failed
    #[error("Conflict: {message}")]
    #[diagnostic(
        code(portcullis::cli::conflict),
        help("re-read the stored object and reapply your changes")
    )]
    Conflict { message: String },

    /// Manifest could not be read or has an unsupported kind
    #[error("Manifest error: {message}")]
    #[diagnostic(code(portcullis::cli::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Configuration file is invalid
    #[error("Config error: {message}")]
    #[diagnostic(code(portcullis::cli::config))]
    Config { message: String },

    /// Invalid command-line input
    #[error("{message}")]
    #[diagnostic(code(portcullis::cli::usage))]
    Usage { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(portcullis::cli::io))]
    Io { message: String },

    /// Any other request failure
    #[error("{message}")]
    #[diagnostic(code(portcullis::cli::api))]
    Api { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Conflict { .. } => exit_codes::CONFLICT_ERROR,
            CliError::Manifest { .. } => exit_codes::MANIFEST_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Api { .. } => exit_codes::ERROR,
        }
    }

    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
            help: None,
        }
    }

    pub fn manifest_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Invalid { kind, name, errors } => CliError::Validation {
                message: format!("{kind} \"{name}\" is invalid"),
                help: Some(
                    errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n"),
                ),
            },
            ApiError::Conflict { .. } => CliError::Conflict {
                message: err.to_string(),
            },
            _ => CliError::Api {
                message: err.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::{ErrorList, FieldError, Path};

    #[test]
    fn test_invalid_becomes_validation() {
        let errors: ErrorList = vec![
            FieldError::required(Path::new("spec").child("host"), ""),
            FieldError::required(Path::new("metadata").child("name"), ""),
        ]
        .into();
        let err = CliError::from(ApiError::invalid("Route", "web", errors));

        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(err.to_string(), "Validation failed: Route \"web\" is invalid");
        match err {
            CliError::Validation { help, .. } => assert_eq!(
                help.as_deref(),
                Some("spec.host: Required value\nmetadata.name: Required value")
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_conflict_exit_code() {
        let err = CliError::from(ApiError::Conflict {
            kind: "Route".to_string(),
            name: "web".to_string(),
            message: "stale".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::CONFLICT_ERROR);
    }

    #[test]
    fn test_other_api_errors() {
        let err = CliError::from(ApiError::BadRequest("namespace mismatch".to_string()));
        assert_eq!(err.exit_code(), exit_codes::ERROR);
        assert_eq!(err.to_string(), "namespace mismatch");
    }
}

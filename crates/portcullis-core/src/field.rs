//! Structured, field-scoped validation errors
//!
//! Validation never fails with an exception-like error. Each validator returns an
//! [`ErrorList`], an ordered and possibly empty collection of [`FieldError`]s; the
//! empty list is the only success value.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// =============================================================================
// PATH
// =============================================================================

/// Dotted path to a field, e.g. `spec.triggers[1].github.secret`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

impl Path {
    /// Start a path at a root field
    pub fn new(root: &str) -> Self {
        Self(root.to_string())
    }

    /// Descend into a named child field
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Descend into a list element
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    /// Descend into a map entry
    pub fn key(&self, k: &str) -> Self {
        Self(format!("{}[{}]", self.0, k))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// FIELD ERROR
// =============================================================================

/// Classification of a field error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    Required,
    Invalid,
    Forbidden,
    NotSupported,
    TooLong,
    TooMany,
}

impl ErrorType {
    /// Human-readable label used when rendering the error
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "Required value",
            Self::Invalid => "Invalid value",
            Self::Forbidden => "Forbidden",
            Self::NotSupported => "Unsupported value",
            Self::TooLong => "Too long",
            Self::TooMany => "Too many",
        }
    }

    /// Whether the offending value is part of the rendered message
    fn shows_value(&self) -> bool {
        matches!(
            self,
            Self::Invalid | Self::NotSupported | Self::TooMany
        )
    }
}

/// A single validation failure attached to a field path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub field: Path,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl FieldError {
    fn new(
        error_type: ErrorType,
        field: Path,
        bad_value: Option<JsonValue>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type,
            field,
            bad_value,
            detail: detail.into(),
        }
    }

    pub fn required(field: Path, detail: impl Into<String>) -> Self {
        Self::new(ErrorType::Required, field, None, detail)
    }

    pub fn invalid(field: Path, value: impl Into<JsonValue>, detail: impl Into<String>) -> Self {
        Self::new(ErrorType::Invalid, field, Some(value.into()), detail)
    }

    pub fn forbidden(field: Path, detail: impl Into<String>) -> Self {
        Self::new(ErrorType::Forbidden, field, None, detail)
    }

    pub fn not_supported(field: Path, value: impl Into<JsonValue>, supported: &[&str]) -> Self {
        let detail = if supported.is_empty() {
            String::new()
        } else {
            let quoted: Vec<String> = supported.iter().map(|s| format!("\"{s}\"")).collect();
            format!("supported values: {}", quoted.join(", "))
        };
        Self::new(ErrorType::NotSupported, field, Some(value.into()), detail)
    }

    pub fn too_long(field: Path, max: usize) -> Self {
        Self::new(
            ErrorType::TooLong,
            field,
            None,
            format!("must have at most {max} characters"),
        )
    }

    pub fn too_many(field: Path, actual: usize, max: usize) -> Self {
        Self::new(
            ErrorType::TooMany,
            field,
            Some(actual.into()),
            format!("must have at most {max} items"),
        )
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_type.as_str())?;
        if self.error_type.shows_value() {
            if let Some(value) = &self.bad_value {
                write!(f, ": {value}")?;
            }
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

// =============================================================================
// ERROR LIST
// =============================================================================

/// Ordered collection of field errors; empty means "acceptable"
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: FieldError) {
        self.0.push(err);
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Errors whose path equals or lies under `prefix`
    pub fn under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| {
            let field = e.field.as_str();
            field == prefix
                || field
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }
}

impl From<Vec<FieldError>> for ErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => Ok(()),
            [single] => write!(f, "{single}"),
            many => {
                let parts: Vec<String> = many.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_building() {
        let path = Path::new("spec").child("triggers").index(2).child("github");
        assert_eq!(path.as_str(), "spec.triggers[2].github");

        let annotations = Path::new("metadata").child("annotations").key("a/b");
        assert_eq!(annotations.to_string(), "metadata.annotations[a/b]");
    }

    #[test]
    fn test_empty_root_child() {
        assert_eq!(Path::default().child("spec").as_str(), "spec");
    }

    #[test]
    fn test_invalid_renders_value_and_detail() {
        let err = FieldError::invalid(Path::new("spec").child("host"), "a_b", "bad host");
        assert_eq!(err.to_string(), r#"spec.host: Invalid value: "a_b": bad host"#);
    }

    #[test]
    fn test_required_hides_value() {
        let err = FieldError::required(Path::new("metadata").child("name"), "name or generateName is required");
        assert_eq!(
            err.to_string(),
            "metadata.name: Required value: name or generateName is required"
        );
    }

    #[test]
    fn test_not_supported_lists_values() {
        let err = FieldError::not_supported(Path::new("spec").child("to").child("kind"), "Pod", &["Service"]);
        assert_eq!(
            err.to_string(),
            r#"spec.to.kind: Unsupported value: "Pod": supported values: "Service""#
        );
    }

    #[test]
    fn test_error_list_display() {
        let mut list = ErrorList::new();
        assert_eq!(list.to_string(), "");

        list.push(FieldError::forbidden(Path::new("spec").child("path"), "no paths"));
        assert_eq!(list.to_string(), "spec.path: Forbidden: no paths");

        list.push(FieldError::too_long(Path::new("metadata").child("name"), 63));
        assert_eq!(
            list.to_string(),
            "[spec.path: Forbidden: no paths, metadata.name: Too long: must have at most 63 characters]"
        );
    }

    #[test]
    fn test_under_matches_prefix_boundaries() {
        let list: ErrorList = vec![
            FieldError::required(Path::new("spec").child("host"), ""),
            FieldError::required(Path::new("spec").child("hostname"), ""),
            FieldError::required(Path::new("spec").child("host").child("x"), ""),
        ]
        .into();

        let hits: Vec<&str> = list.under("spec.host").map(|e| e.field.as_str()).collect();
        assert_eq!(hits, vec!["spec.host", "spec.host.x"]);
    }
}

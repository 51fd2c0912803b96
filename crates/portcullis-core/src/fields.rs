//! Indexable field sets and field selectors

use std::collections::BTreeMap;
use std::fmt;

/// Selectable fields of a resource, keyed by dotted field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set(BTreeMap<String, String>);

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field; absent fields read as the empty string
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Set {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Field comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRequirement {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
}

impl FieldRequirement {
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::NotEquals { field, .. } => field,
        }
    }

    pub fn matches(&self, fields: &Set) -> bool {
        match self {
            Self::Equals { field, value } => fields.get(field) == value,
            Self::NotEquals { field, value } => fields.get(field) != value,
        }
    }
}

impl fmt::Display for FieldRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{field}={value}"),
            Self::NotEquals { field, value } => write!(f, "{field}!={value}"),
        }
    }
}

/// Conjunction of field requirements; empty matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<FieldRequirement>,
}

impl Selector {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.requirements.push(FieldRequirement::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn not_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.requirements.push(FieldRequirement::NotEquals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[FieldRequirement] {
        &self.requirements
    }

    pub fn matches(&self, fields: &Set) -> bool {
        self.requirements.iter().all(|r| r.matches(fields))
    }

    /// Value the selector pins `field` to, if it carries an exact-match clause
    pub fn requires_exact_match(&self, field: &str) -> Option<&str> {
        self.requirements.iter().find_map(|r| match r {
            FieldRequirement::Equals { field: f, value } if f == field => Some(value.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Set {
        [("metadata.name", "frontend"), ("spec.host", "www.example.com")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_missing_field_reads_empty() {
        assert_eq!(fields().get("spec.path"), "");
        assert!(Selector::everything().equals("spec.path", "").matches(&fields()));
    }

    #[test]
    fn test_equality_and_inequality() {
        let sel = Selector::everything()
            .equals("metadata.name", "frontend")
            .not_equals("spec.host", "other.example.com");
        assert!(sel.matches(&fields()));
        assert_eq!(sel.to_string(), "metadata.name=frontend,spec.host!=other.example.com");

        let miss = Selector::everything().equals("spec.host", "nope");
        assert!(!miss.matches(&fields()));
    }

    #[test]
    fn test_requires_exact_match() {
        let sel = Selector::everything()
            .not_equals("metadata.name", "a")
            .equals("metadata.name", "b");
        assert_eq!(sel.requires_exact_match("metadata.name"), Some("b"));
        assert_eq!(sel.requires_exact_match("spec.host"), None);
    }
}

//! Loading API objects from YAML manifests
//!
//! The concrete type is picked from the document's `kind`. A file may hold several
//! documents separated by `---`, or a single `kind: List` with `items`.

use serde::Deserialize;
use std::path::Path;

use portcullis_build::BuildConfig;
use portcullis_core::{Object, SelectionPredicate, fields, labels};
use portcullis_route::Route;

use crate::error::{CliError, Result};

/// Kinds the CLI can load
pub const SUPPORTED_KINDS: &[&str] = &["BuildConfig", "Route"];

/// One decoded API object
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    BuildConfig(BuildConfig),
    Route(Route),
}

impl Manifest {
    /// Decode a YAML value according to its `kind`
    pub fn from_value(value: serde_yaml::Value) -> Result<Self> {
        let kind = value
            .get("kind")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default()
            .to_string();
        match kind.as_str() {
            "BuildConfig" => serde_yaml::from_value(value)
                .map(Self::BuildConfig)
                .map_err(|e| CliError::manifest(format!("BuildConfig: {e}"))),
            "Route" => serde_yaml::from_value(value)
                .map(Self::Route)
                .map_err(|e| CliError::manifest(format!("Route: {e}"))),
            "" => Err(CliError::manifest_with_help(
                "document has no kind",
                format!("set `kind` to one of: {}", SUPPORTED_KINDS.join(", ")),
            )),
            other => Err(CliError::manifest_with_help(
                format!("unsupported kind {other}"),
                format!("supported kinds: {}", SUPPORTED_KINDS.join(", ")),
            )),
        }
    }

    /// Decode every object in `content`
    pub fn parse_all(content: &str) -> Result<Vec<Self>> {
        let mut manifests = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|e| CliError::manifest(e.to_string()))?;
            if value.is_null() {
                continue;
            }
            if value.get("kind").and_then(serde_yaml::Value::as_str) == Some("List") {
                let items = value
                    .get("items")
                    .and_then(serde_yaml::Value::as_sequence)
                    .cloned()
                    .unwrap_or_default();
                for item in items {
                    manifests.push(Self::from_value(item)?);
                }
            } else {
                manifests.push(Self::from_value(value)?);
            }
        }
        Ok(manifests)
    }

    /// Decode the single object in `content`
    pub fn parse(content: &str) -> Result<Self> {
        let mut manifests = Self::parse_all(content)?;
        match manifests.len() {
            1 => Ok(manifests.remove(0)),
            0 => Err(CliError::manifest("no object found")),
            n => Err(CliError::manifest(format!("expected one object, found {n}"))),
        }
    }

    /// Load the single object in the file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| with_path(e, path))
    }

    /// Load every object in the file at `path`
    pub fn load_all(path: &Path) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_all(&content).map_err(|e| with_path(e, path))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::BuildConfig(_) => "BuildConfig",
            Self::Route(_) => "Route",
        }
    }

    pub fn object(&self) -> &dyn Object {
        match self {
            Self::BuildConfig(bc) => bc,
            Self::Route(route) => route,
        }
    }

    pub fn object_mut(&mut self) -> &mut dyn Object {
        match self {
            Self::BuildConfig(bc) => bc,
            Self::Route(route) => route,
        }
    }

    /// Selection predicate for this object's kind
    pub fn matcher(&self, label: labels::Selector, field: fields::Selector) -> SelectionPredicate {
        match self {
            Self::BuildConfig(_) => portcullis_build::matcher(label, field),
            Self::Route(_) => portcullis_route::matcher(label, field),
        }
    }

    /// `namespace/name` of the object
    pub fn key(&self) -> String {
        let meta = self.object().object_meta();
        format!(
            "{}/{}",
            meta.namespace.as_deref().unwrap_or_default(),
            meta.name.as_deref().unwrap_or_default()
        )
    }

    pub fn to_yaml(&self) -> Result<String> {
        let out = match self {
            Self::BuildConfig(bc) => serde_yaml::to_string(bc),
            Self::Route(route) => serde_yaml::to_string(route),
        };
        out.map_err(|e| CliError::manifest(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        let out = match self {
            Self::BuildConfig(bc) => serde_json::to_string_pretty(bc),
            Self::Route(route) => serde_json::to_string_pretty(route),
        };
        out.map_err(|e| CliError::manifest(e.to_string()))
    }
}

fn with_path(err: CliError, path: &Path) -> CliError {
    match err {
        CliError::Manifest { message, help } => CliError::Manifest {
            message: format!("{}: {message}", path.display()),
            help,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE: &str = "apiVersion: route.openshift.io/v1\nkind: Route\nmetadata:\n  name: web\n  namespace: shop\nspec:\n  to:\n    name: web\n";

    #[test]
    fn test_parse_by_kind() {
        let manifest = Manifest::parse(ROUTE).unwrap();
        assert_eq!(manifest.kind(), "Route");
        assert_eq!(manifest.key(), "shop/web");
        assert_eq!(manifest.object().object_kind(), "Route");
    }

    #[test]
    fn test_parse_multi_document() {
        let content = format!(
            "{ROUTE}---\nkind: BuildConfig\nmetadata:\n  name: app\n  namespace: shop\n"
        );
        let manifests = Manifest::parse_all(&content).unwrap();
        let kinds: Vec<_> = manifests.iter().map(Manifest::kind).collect();
        assert_eq!(kinds, vec!["Route", "BuildConfig"]);
    }

    #[test]
    fn test_parse_list() {
        let content = "kind: List\nitems:\n  - kind: Route\n    metadata:\n      name: a\n  - kind: Route\n    metadata:\n      name: b\n";
        let manifests = Manifest::parse_all(content).unwrap();
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[1].key(), "/b");
    }

    #[test]
    fn test_unsupported_kind() {
        let err = Manifest::parse("kind: Pod\nmetadata:\n  name: x\n").unwrap_err();
        assert_eq!(err.to_string(), "Manifest error: unsupported kind Pod");
    }

    #[test]
    fn test_parse_expects_single_object() {
        let content = format!("{ROUTE}---\n{ROUTE}");
        let err = Manifest::parse(&content).unwrap_err();
        assert_eq!(err.to_string(), "Manifest error: expected one object, found 2");
    }

    #[test]
    fn test_matcher_follows_kind() {
        let manifest = Manifest::parse(ROUTE).unwrap();
        let by_backend = fields::Selector::everything().equals("spec.to.name", "web");
        let predicate = manifest.matcher(labels::Selector::everything(), by_backend);
        assert!(predicate.matches(manifest.object()).unwrap());
    }
}

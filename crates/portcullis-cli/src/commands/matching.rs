//! Match command - filter manifests with label and field requirements

use std::path::Path;

use crate::display::{self, OutputFormat};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::selector::{parse_field_selector, parse_label_selector};

pub fn run(
    file: &Path,
    label_flags: &[String],
    field_flags: &[String],
    output: OutputFormat,
) -> Result<()> {
    let manifests = Manifest::load_all(file)?;
    let hits = select(&manifests, label_flags, field_flags)?;

    display::step(&format!("{} of {} object(s) match", hits.len(), manifests.len()));
    for manifest in hits {
        display::print_manifest(manifest, output)?;
        if output == OutputFormat::Yaml {
            println!("---");
        }
    }
    Ok(())
}

/// The manifests both selectors accept, in input order
pub fn select<'a>(
    manifests: &'a [Manifest],
    label_flags: &[String],
    field_flags: &[String],
) -> Result<Vec<&'a Manifest>> {
    let label = parse_label_selector(label_flags)?;
    let field = parse_field_selector(field_flags)?;

    let mut hits = Vec::new();
    for manifest in manifests {
        let predicate = manifest.matcher(label.clone(), field.clone());
        if predicate.matches(manifest.object())? {
            hits.push(manifest);
        }
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"
kind: List
items:
  - kind: Route
    metadata:
      name: shop
      namespace: web
      labels:
        tier: edge
    spec:
      host: shop.example.com
      to:
        name: shop
  - kind: Route
    metadata:
      name: api
      namespace: web
    spec:
      to:
        name: api-v2
  - kind: BuildConfig
    metadata:
      name: shop
      namespace: web
      labels:
        tier: edge
"#;

    fn flags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn keys(hits: &[&Manifest]) -> Vec<String> {
        hits.iter().map(|m| format!("{} {}", m.kind(), m.key())).collect()
    }

    #[test]
    fn test_label_match_spans_kinds() {
        let manifests = Manifest::parse_all(ITEMS).unwrap();
        let hits = select(&manifests, &flags(&["tier=edge"]), &[]).unwrap();
        assert_eq!(keys(&hits), vec!["Route web/shop", "BuildConfig web/shop"]);
    }

    #[test]
    fn test_field_match_uses_kind_fields() {
        let manifests = Manifest::parse_all(ITEMS).unwrap();
        let hits = select(&manifests, &[], &flags(&["spec.to.name=api-v2"])).unwrap();
        assert_eq!(keys(&hits), vec!["Route web/api"]);
    }

    #[test]
    fn test_unknown_field_is_empty() {
        let manifests = Manifest::parse_all(ITEMS).unwrap();
        // BuildConfigs have no spec.host, so it reads as ""
        let hits = select(&manifests, &[], &flags(&["spec.host="])).unwrap();
        assert_eq!(keys(&hits), vec!["Route web/api", "BuildConfig web/shop"]);
    }

    #[test]
    fn test_no_requirements_selects_all() {
        let manifests = Manifest::parse_all(ITEMS).unwrap();
        assert_eq!(select(&manifests, &[], &[]).unwrap().len(), 3);
    }
}

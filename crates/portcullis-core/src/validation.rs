//! Shared validation helpers: names, DNS rules, and object metadata

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use regex::Regex;
use std::sync::LazyLock;

use crate::field::{ErrorList, FieldError, Path};

/// Maximum length of a DNS-1123 subdomain
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

/// Maximum length of a DNS-1123 label
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;

static DNS1123_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

static DNS1123_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid regex")
});

/// Problems with `value` as a DNS-1123 label; empty when valid
pub fn is_dns1123_label(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        problems.push(format!(
            "must be no more than {DNS1123_LABEL_MAX_LENGTH} characters"
        ));
    }
    if !DNS1123_LABEL.is_match(value) {
        problems.push(
            "a DNS-1123 label must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    problems
}

/// Problems with `value` as a DNS-1123 subdomain; empty when valid
pub fn is_dns1123_subdomain(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        problems.push(format!(
            "must be no more than {DNS1123_SUBDOMAIN_MAX_LENGTH} characters"
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        problems.push(
            "a DNS-1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', \
             and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    problems
}

/// Problems with `name` as a URL path segment; empty when valid
pub fn is_path_segment_name(name: &str) -> Vec<String> {
    if name == "." || name == ".." {
        return vec![format!("may not be '{name}'")];
    }
    ["/", "%"]
        .iter()
        .filter(|bad| name.contains(*bad))
        .map(|bad| format!("may not contain '{bad}'"))
        .collect()
}

/// Validate metadata of an object about to be created
pub fn validate_object_meta(meta: &ObjectMeta, requires_namespace: bool, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    let name = meta.name.as_deref().unwrap_or_default();
    let generate_name = meta.generate_name.as_deref().unwrap_or_default();
    if name.is_empty() {
        if generate_name.is_empty() {
            errs.push(FieldError::required(
                path.child("name"),
                "name or generateName is required",
            ));
        }
    } else {
        for problem in is_path_segment_name(name) {
            errs.push(FieldError::invalid(path.child("name"), name, problem));
        }
    }
    if !generate_name.is_empty() {
        for problem in is_path_segment_name(generate_name) {
            errs.push(FieldError::invalid(path.child("generateName"), generate_name, problem));
        }
    }

    let namespace = meta.namespace.as_deref().unwrap_or_default();
    if requires_namespace {
        if namespace.is_empty() {
            errs.push(FieldError::required(path.child("namespace"), ""));
        } else {
            for problem in is_dns1123_label(namespace) {
                errs.push(FieldError::invalid(path.child("namespace"), namespace, problem));
            }
        }
    } else if !namespace.is_empty() {
        errs.push(FieldError::forbidden(
            path.child("namespace"),
            "not allowed on this type",
        ));
    }

    if let Some(labels) = &meta.labels {
        let labels_path = path.child("labels");
        for (key, value) in labels {
            if value.len() > DNS1123_LABEL_MAX_LENGTH {
                errs.push(FieldError::too_long(labels_path.key(key), DNS1123_LABEL_MAX_LENGTH));
            }
        }
    }

    errs
}

/// Reject a change to a field that may not change after creation
pub fn validate_immutable_field<T>(new: &T, old: &T, path: Path) -> ErrorList
where
    T: PartialEq + serde::Serialize,
{
    let mut errs = ErrorList::new();
    if new != old {
        let value = serde_json::to_value(new).unwrap_or_default();
        errs.push(FieldError::invalid(path, value, "field is immutable"));
    }
    errs
}

/// Validate metadata of an object being updated against its stored form
pub fn validate_object_meta_update(new: &ObjectMeta, old: &ObjectMeta, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    errs.extend(validate_immutable_field(&new.name, &old.name, path.child("name")));
    errs.extend(validate_immutable_field(
        &new.namespace,
        &old.namespace,
        path.child("namespace"),
    ));
    errs.extend(validate_immutable_field(&new.uid, &old.uid, path.child("uid")));
    errs.extend(validate_immutable_field(
        &new.creation_timestamp,
        &old.creation_timestamp,
        path.child("creationTimestamp"),
    ));
    errs
}

//! Label and field requirements given as repeated command-line flags
//!
//! Each flag holds one requirement; there is no comma-separated selector grammar.
//!
//! | flag value  | label meaning      | field meaning   |
//! |-------------|--------------------|-----------------|
//! | `k=v`       | equals             | equals          |
//! | `k==v`      | equals             | equals          |
//! | `k!=v`      | not equals         | not equals      |
//! | `k`         | exists             | -               |
//! | `!k`        | does not exist     | -               |

use portcullis_core::{fields, labels};

use crate::error::{CliError, Result};

/// Build a label selector from `-l` flag values
pub fn parse_label_selector(flags: &[String]) -> Result<labels::Selector> {
    flags.iter().try_fold(labels::Selector::everything(), |selector, flag| {
        Ok(selector.with(parse_label_requirement(flag)?))
    })
}

/// Build a field selector from `-F` flag values
pub fn parse_field_selector(flags: &[String]) -> Result<fields::Selector> {
    let mut selector = fields::Selector::everything();
    for flag in flags {
        selector = match split(flag) {
            Some((field, false, value)) => selector.equals(field, value),
            Some((field, true, value)) => selector.not_equals(field, value),
            None => {
                return Err(CliError::usage(format!(
                    "invalid field requirement {flag:?}: expected field=value or field!=value"
                )));
            }
        };
    }
    Ok(selector)
}

fn parse_label_requirement(flag: &str) -> Result<labels::Requirement> {
    let requirement = match split(flag) {
        Some((key, false, value)) => labels::Requirement::equals(key, value),
        Some((key, true, value)) => labels::Requirement::not_equals(key, value),
        None => match flag.strip_prefix('!') {
            Some(key) => labels::Requirement::does_not_exist(key.trim()),
            None => labels::Requirement::exists(flag.trim()),
        },
    };
    if requirement.key().is_empty() {
        return Err(CliError::usage(format!("invalid label requirement {flag:?}: empty key")));
    }
    Ok(requirement)
}

/// Split `k=v`, `k==v` or `k!=v` into (key, negated, value)
fn split(flag: &str) -> Option<(&str, bool, &str)> {
    if let Some((key, value)) = flag.split_once("!=") {
        return Some((key.trim(), true, value.trim()));
    }
    if let Some((key, value)) = flag.split_once("==") {
        return Some((key.trim(), false, value.trim()));
    }
    flag.split_once('=')
        .map(|(key, value)| (key.trim(), false, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_label_requirements() {
        let selector =
            parse_label_selector(&flags(&["app=web", "tier!=db", "team", "!legacy"])).unwrap();

        let ops: Vec<_> = selector.requirements().iter().map(|r| r.operator()).collect();
        assert_eq!(
            ops,
            vec![
                labels::Operator::Equals,
                labels::Operator::NotEquals,
                labels::Operator::Exists,
                labels::Operator::DoesNotExist,
            ]
        );

        let set: labels::Set = [("app", "web"), ("team", "a")].into_iter().collect();
        assert!(selector.matches(&set));
    }

    #[test]
    fn test_double_equals() {
        let selector =
            parse_field_selector(&flags(&["spec.host==a.example.com", " spec.path != /v1"]))
                .unwrap();
        let names: Vec<_> = selector.requirements().iter().map(|r| r.field()).collect();
        assert_eq!(names, vec!["spec.host", "spec.path"]);

        let set: fields::Set = [("spec.host", "a.example.com")].into_iter().collect();
        assert!(selector.matches(&set));
    }

    #[test]
    fn test_field_requires_operator() {
        let err = parse_field_selector(&flags(&["spec.host"])).unwrap_err();
        assert!(matches!(err, CliError::Usage { .. }));
    }

    #[test]
    fn test_empty_label_key() {
        assert!(parse_label_selector(&flags(&["=web"])).is_err());
        assert!(parse_label_selector(&flags(&["!"])).is_err());
    }

    #[test]
    fn test_no_flags_selects_everything() {
        assert!(parse_label_selector(&[]).unwrap().is_empty());
        assert!(parse_field_selector(&[]).unwrap().is_empty());
    }
}

//! BuildConfig lifecycle strategy

use portcullis_core::object::downcast_ref;
use portcullis_core::{
    DeleteOptions, ErrorList, Object, RestStrategy, Result, SelectionPredicate, fields, labels,
};

use crate::api::{BuildConfig, to_selectable_fields};
use crate::validation::{validate_build_config, validate_build_config_update};

/// Hooks governing BuildConfig create and update
///
/// Stateless; one instance serves every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildConfigStrategy;

impl BuildConfigStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// Drop triggers of unknown type, keeping the survivors in order
pub fn drop_unknown_triggers(bc: &mut BuildConfig) {
    let before = bc.spec.triggers.len();
    bc.spec.triggers.retain(|t| {
        let known = t.trigger_type.is_known();
        if !known {
            tracing::debug!(trigger_type = %t.trigger_type, "dropping unknown build trigger");
        }
        known
    });
    let dropped = before - bc.spec.triggers.len();
    if dropped > 0 {
        tracing::debug!(
            build_config = bc.metadata.name.as_deref().unwrap_or_default(),
            dropped,
            "sanitized build triggers"
        );
    }
}

impl RestStrategy for BuildConfigStrategy {
    type Object = BuildConfig;

    fn namespace_scoped(&self) -> bool {
        true
    }

    fn allow_create_on_update(&self) -> bool {
        false
    }

    fn allow_unconditional_update(&self) -> bool {
        false
    }

    fn prepare_for_create(&self, bc: &mut BuildConfig) {
        drop_unknown_triggers(bc);
    }

    fn prepare_for_update(&self, bc: &mut BuildConfig, old: &BuildConfig) {
        drop_unknown_triggers(bc);

        // lastVersion never moves backwards
        if bc.status.last_version < old.status.last_version {
            tracing::debug!(
                submitted = bc.status.last_version,
                stored = old.status.last_version,
                "restoring build config lastVersion"
            );
            bc.status.last_version = old.status.last_version;
        }
    }

    fn validate(&self, bc: &BuildConfig) -> ErrorList {
        validate_build_config(bc)
    }

    fn validate_update(&self, bc: &BuildConfig, old: &BuildConfig) -> ErrorList {
        validate_build_config_update(bc, old)
    }

    fn canonicalize(&self, _bc: &mut BuildConfig) {}

    fn check_graceful_delete(&self, _bc: &BuildConfig, _options: &DeleteOptions) -> bool {
        false
    }
}

/// Label and field projection of a BuildConfig
pub fn get_attrs(obj: &dyn Object) -> Result<(labels::Set, fields::Set)> {
    let bc = downcast_ref::<BuildConfig>(obj)?;
    Ok((
        labels::Set::from(bc.metadata.labels.as_ref()),
        to_selectable_fields(bc),
    ))
}

/// Selection predicate over BuildConfigs
pub fn matcher(label: labels::Selector, field: fields::Selector) -> SelectionPredicate {
    SelectionPredicate::new(label, field, get_attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BuildTriggerPolicy, BuildTriggerType};
    use portcullis_core::ApiError;

    fn types(bc: &BuildConfig) -> Vec<&str> {
        bc.spec.triggers.iter().map(|t| t.trigger_type.as_str()).collect()
    }

    #[test]
    fn test_prepare_for_create_filters_triggers() {
        let mut bc = BuildConfig::new("proj", "app").with_triggers(vec![
            BuildTriggerPolicy::of_type("BogusType"),
            BuildTriggerPolicy::generic("a"),
            BuildTriggerPolicy::of_type(""),
            BuildTriggerPolicy::config_change(),
            BuildTriggerPolicy::of_type("github"),
        ]);
        BuildConfigStrategy.prepare_for_create(&mut bc);
        assert_eq!(types(&bc), vec!["Generic", "ConfigChange"]);
    }

    #[test]
    fn test_trigger_without_type_decodes_and_is_dropped() {
        let yaml = r#"
kind: BuildConfig
metadata:
  name: app
  namespace: proj
spec:
  triggers:
    - type: ConfigChange
    - generic:
        secret: s3cr3t
"#;
        let mut bc: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(types(&bc), vec!["ConfigChange", ""]);

        BuildConfigStrategy.prepare_for_create(&mut bc);
        assert_eq!(types(&bc), vec!["ConfigChange"]);
    }

    #[test]
    fn test_prepare_for_create_is_idempotent() {
        let mut bc = BuildConfig::new("proj", "app").with_triggers(vec![
            BuildTriggerPolicy::generic("a"),
            BuildTriggerPolicy::of_type("BogusType"),
        ]);
        BuildConfigStrategy.prepare_for_create(&mut bc);
        let once = bc.clone();
        BuildConfigStrategy.prepare_for_create(&mut bc);
        assert_eq!(bc, once);
    }

    #[test]
    fn test_prepare_for_update_keeps_higher_version() {
        let old = BuildConfig::new("proj", "app").with_last_version(5);

        let mut stale = BuildConfig::new("proj", "app").with_last_version(3);
        BuildConfigStrategy.prepare_for_update(&mut stale, &old);
        assert_eq!(stale.status.last_version, 5);

        let mut newer = BuildConfig::new("proj", "app").with_last_version(8);
        BuildConfigStrategy.prepare_for_update(&mut newer, &old);
        assert_eq!(newer.status.last_version, 8);
    }

    #[test]
    fn test_prepare_for_update_sanitizes_triggers() {
        let old = BuildConfig::new("proj", "app");
        let mut bc = BuildConfig::new("proj", "app").with_triggers(vec![
            BuildTriggerPolicy::of_type("Nope"),
            BuildTriggerPolicy::image_change(None),
        ]);
        BuildConfigStrategy.prepare_for_update(&mut bc, &old);
        assert_eq!(bc.spec.triggers.len(), 1);
        assert_eq!(bc.spec.triggers[0].trigger_type, BuildTriggerType::IMAGE_CHANGE);
    }

    #[test]
    fn test_flags() {
        let s = BuildConfigStrategy::new();
        assert!(s.namespace_scoped());
        assert!(!s.allow_create_on_update());
        assert!(!s.allow_unconditional_update());
        assert!(!s.check_graceful_delete(&BuildConfig::default(), &DeleteOptions::default()));
    }

    #[test]
    fn test_get_attrs() {
        let mut bc = BuildConfig::new("proj", "app");
        bc.metadata.labels = Some([("team".to_string(), "ci".to_string())].into());

        let (labels, fields) = get_attrs(&bc).unwrap();
        assert_eq!(labels.get("team"), Some("ci"));
        assert_eq!(fields.get("metadata.name"), "app");
        assert_eq!(fields.get("metadata.namespace"), "proj");
    }

    #[test]
    fn test_get_attrs_rejects_other_kinds() {
        #[derive(Debug, Default)]
        struct NotABuild {
            metadata: portcullis_core::ObjectMeta,
        }

        impl kube::Resource for NotABuild {
            type DynamicType = ();
            type Scope = k8s_openapi::NamespaceResourceScope;

            fn kind(_: &()) -> std::borrow::Cow<'_, str> {
                "NotABuild".into()
            }
            fn group(_: &()) -> std::borrow::Cow<'_, str> {
                "".into()
            }
            fn version(_: &()) -> std::borrow::Cow<'_, str> {
                "v1".into()
            }
            fn plural(_: &()) -> std::borrow::Cow<'_, str> {
                "notabuilds".into()
            }
            fn meta(&self) -> &portcullis_core::ObjectMeta {
                &self.metadata
            }
            fn meta_mut(&mut self) -> &mut portcullis_core::ObjectMeta {
                &mut self.metadata
            }
        }

        let err = get_attrs(&NotABuild::default()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::TypeMismatch { ref expected, ref found }
                if expected == "BuildConfig" && found == "NotABuild"
        ));
    }

    #[test]
    fn test_matcher_by_label() {
        let mut web = BuildConfig::new("proj", "web");
        web.metadata.labels = Some([("app".to_string(), "web".to_string())].into());
        let api = BuildConfig::new("proj", "api");

        let m = matcher(
            labels::Selector::everything().with(labels::Requirement::equals("app", "web")),
            fields::Selector::everything(),
        );
        let items = vec![web, api];
        let hits = m.filter(&items).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.name.as_deref(), Some("web"));
    }
}

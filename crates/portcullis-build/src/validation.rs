//! Validation rules for BuildConfig objects

use k8s_openapi::api::core::v1::ObjectReference;
use portcullis_core::validation::{validate_object_meta, validate_object_meta_update};
use portcullis_core::{ErrorList, FieldError, Path};

use crate::api::{
    BuildConfig, BuildStrategyType, BuildTriggerPolicy, BuildTriggerType, KNOWN_TRIGGER_TYPES,
};

/// Validate a BuildConfig about to be created
pub fn validate_build_config(bc: &BuildConfig) -> ErrorList {
    let mut errs = validate_object_meta(&bc.metadata, true, &Path::new("metadata"));

    let spec = Path::new("spec");
    errs.extend(validate_triggers(bc, &spec.child("triggers")));
    errs.extend(validate_source_and_strategy(bc, &spec));

    if let Some(to) = &bc.spec.output.to {
        errs.extend(validate_image_reference(
            to,
            &spec.child("output").child("to"),
            &["ImageStreamTag", "DockerImage"],
        ));
    }

    for (limit, name) in [
        (bc.spec.successful_builds_history_limit, "successfulBuildsHistoryLimit"),
        (bc.spec.failed_builds_history_limit, "failedBuildsHistoryLimit"),
    ] {
        if let Some(limit) = limit.filter(|l| *l < 0) {
            errs.push(FieldError::invalid(
                spec.child(name),
                limit,
                "must be greater than or equal to 0",
            ));
        }
    }

    if bc.status.last_version < 0 {
        errs.push(FieldError::invalid(
            Path::new("status").child("lastVersion"),
            bc.status.last_version,
            "must be greater than or equal to 0",
        ));
    }

    errs
}

/// Validate an update of a BuildConfig against its stored form
pub fn validate_build_config_update(bc: &BuildConfig, old: &BuildConfig) -> ErrorList {
    let mut errs =
        validate_object_meta_update(&bc.metadata, &old.metadata, &Path::new("metadata"));
    errs.extend(validate_build_config(bc));
    errs
}

fn validate_triggers(bc: &BuildConfig, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    let mut default_image_triggers = 0usize;

    for (i, trigger) in bc.spec.triggers.iter().enumerate() {
        let path = path.index(i);
        errs.extend(validate_trigger(trigger, &path));

        if trigger.trigger_type == BuildTriggerType::IMAGE_CHANGE {
            let watches_strategy_image = trigger
                .image_change
                .as_ref()
                .is_some_and(|ic| ic.from.is_none());
            if watches_strategy_image {
                default_image_triggers += 1;
                if default_image_triggers > 1 {
                    errs.push(FieldError::invalid(
                        path.child("imageChange"),
                        "",
                        "only one ImageChange trigger is allowed to reference the strategy image",
                    ));
                } else if bc.spec.strategy.from.is_none() {
                    errs.push(FieldError::invalid(
                        path.child("imageChange"),
                        "",
                        "a default ImageChange trigger can only be used when the strategy includes an image reference",
                    ));
                }
            }
        }
    }

    errs
}

fn validate_trigger(trigger: &BuildTriggerPolicy, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    let trigger_type = trigger.trigger_type.as_str();

    if trigger_type.is_empty() {
        errs.push(FieldError::required(path.child("type"), ""));
        return errs;
    }
    if !trigger.trigger_type.is_known() {
        errs.push(FieldError::not_supported(
            path.child("type"),
            trigger_type,
            KNOWN_TRIGGER_TYPES,
        ));
        return errs;
    }

    if trigger.trigger_type.is_webhook() {
        let field = match trigger_type {
            "GitHub" => "github",
            "Generic" => "generic",
            "GitLab" => "gitlab",
            _ => "bitbucket",
        };
        match trigger.webhook() {
            None => errs.push(FieldError::required(path.child(field), "")),
            Some(hook) if hook.secret.is_empty() => {
                errs.push(FieldError::required(path.child(field).child("secret"), ""))
            }
            Some(_) => {}
        }
    } else if trigger.trigger_type == BuildTriggerType::IMAGE_CHANGE {
        match &trigger.image_change {
            None => errs.push(FieldError::required(path.child("imageChange"), "")),
            Some(ic) => {
                if let Some(from) = &ic.from {
                    errs.extend(validate_image_reference(
                        from,
                        &path.child("imageChange").child("from"),
                        &["ImageStreamTag"],
                    ));
                }
            }
        }
    }

    errs
}

fn validate_source_and_strategy(bc: &BuildConfig, spec: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    let source = &bc.spec.source;
    let strategy = &bc.spec.strategy;

    if let Some(git) = &source.git {
        if git.uri.is_empty() {
            errs.push(FieldError::required(
                spec.child("source").child("git").child("uri"),
                "",
            ));
        }
    }
    if strategy.strategy_type != BuildStrategyType::JenkinsPipeline && !source.has_input() {
        errs.push(FieldError::required(
            spec.child("source"),
            "must provide a value for at least one source input (git, dockerfile)",
        ));
    }

    match (strategy.strategy_type, &strategy.from) {
        (BuildStrategyType::Source | BuildStrategyType::Custom, None) => {
            errs.push(FieldError::required(spec.child("strategy").child("from"), ""));
        }
        (_, Some(from)) => errs.extend(validate_image_reference(
            from,
            &spec.child("strategy").child("from"),
            &["ImageStreamTag", "ImageStreamImage", "DockerImage"],
        )),
        _ => {}
    }

    errs
}

fn validate_image_reference(reference: &ObjectReference, path: &Path, kinds: &[&str]) -> ErrorList {
    let mut errs = ErrorList::new();
    let kind = reference.kind.as_deref().unwrap_or_default();
    if !kinds.contains(&kind) {
        errs.push(FieldError::not_supported(path.child("kind"), kind, kinds));
    }
    if reference.name.as_deref().unwrap_or_default().is_empty() {
        errs.push(FieldError::required(path.child("name"), ""));
    }
    errs
}

//! Create and update drivers
//!
//! These functions own the hook invocation order. A storage layer calls
//! [`before_create`] or [`before_update`] right before persisting and stores the
//! object only when they return `Ok`.

use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{DeleteOptions, Time};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::field::{ErrorList, FieldError, Path};
use crate::names::NameGenerator;
use crate::object::{Object, display_name};
use crate::strategy::DynStrategy;

/// Message attached to resource-version conflicts
pub const OPTIMISTIC_LOCK_ERROR_MSG: &str =
    "the object has been modified; please apply your changes to the latest version and try again";

/// Per-request information the drivers need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Namespace addressed by the request, if any
    pub namespace: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }
}

/// What [`update_or_create`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
}

/// Reconcile the object's namespace with the request's
///
/// An object without a namespace adopts the request's; a mismatch is an error.
fn check_namespace(ctx: &RequestContext, obj: &mut dyn Object) -> Result<()> {
    let request_ns = ctx.namespace.as_deref().unwrap_or_default();
    let meta = obj.object_meta_mut();
    let object_ns = meta.namespace.clone().unwrap_or_default();

    if object_ns.is_empty() {
        if !request_ns.is_empty() {
            meta.namespace = Some(request_ns.to_string());
        }
        return Ok(());
    }
    if !request_ns.is_empty() && request_ns != object_ns.as_str() {
        return Err(ApiError::BadRequest(
            "the namespace of the provided object does not match the namespace sent on the request"
                .to_string(),
        ));
    }
    Ok(())
}

fn new_uid() -> String {
    Uuid::new_v4().to_string()
}

fn invalid(obj: &dyn Object, errors: ErrorList) -> ApiError {
    ApiError::invalid(obj.object_kind(), display_name(obj.object_meta()), errors)
}

/// Run the create hooks on `obj`
///
/// Order: namespace check, system metadata fill, name generation,
/// `prepare_for_create`, `validate`, `canonicalize`.
pub fn before_create(
    strategy: &dyn DynStrategy,
    ctx: &RequestContext,
    obj: &mut dyn Object,
    names: &dyn NameGenerator,
) -> Result<()> {
    if strategy.namespace_scoped() {
        check_namespace(ctx, obj)?;
    } else {
        obj.object_meta_mut().namespace = None;
    }

    {
        let meta = obj.object_meta_mut();
        meta.uid = Some(new_uid());
        meta.creation_timestamp = Some(Time(Utc::now()));
        meta.generation = Some(1);
        meta.resource_version = None;
        meta.deletion_timestamp = None;
        meta.deletion_grace_period_seconds = None;

        let has_name = meta.name.as_deref().is_some_and(|n| !n.is_empty());
        if !has_name {
            if let Some(base) = meta.generate_name.as_deref().filter(|b| !b.is_empty()) {
                meta.name = Some(names.generate_name(base));
            }
        }
    }

    strategy.prepare_for_create(obj)?;

    let errors = strategy.validate(obj)?;
    if !errors.is_empty() {
        tracing::debug!(kind = %obj.object_kind(), errors = %errors, "create rejected");
        return Err(invalid(obj, errors));
    }

    strategy.canonicalize(obj)
}

/// Run the update hooks on `obj` against the stored `old`
///
/// Order: namespace check, resource-version precondition, carry-over of
/// system-owned metadata, `prepare_for_update`, `validate_update`,
/// `canonicalize`.
pub fn before_update(
    strategy: &dyn DynStrategy,
    ctx: &RequestContext,
    obj: &mut dyn Object,
    old: &dyn Object,
) -> Result<()> {
    if strategy.namespace_scoped() {
        check_namespace(ctx, obj)?;
    } else {
        obj.object_meta_mut().namespace = None;
    }

    let old_meta = old.object_meta();
    if !strategy.allow_unconditional_update() {
        let new_rv = obj.object_meta().resource_version.clone().unwrap_or_default();
        if new_rv.is_empty() {
            let errors: ErrorList = vec![FieldError::invalid(
                Path::new("metadata").child("resourceVersion"),
                "",
                "must be specified for an update",
            )]
            .into();
            return Err(invalid(obj, errors));
        }
        if Some(new_rv.as_str()) != old_meta.resource_version.as_deref() {
            return Err(ApiError::Conflict {
                kind: obj.object_kind(),
                name: display_name(obj.object_meta()),
                message: OPTIMISTIC_LOCK_ERROR_MSG.to_string(),
            });
        }
    }

    {
        let meta = obj.object_meta_mut();
        meta.generation = old_meta.generation;
        if meta.uid.is_none() {
            meta.uid = old_meta.uid.clone();
        }
        if meta.creation_timestamp.is_none() {
            meta.creation_timestamp = old_meta.creation_timestamp.clone();
        }
    }

    strategy.prepare_for_update(obj, old)?;

    let errors = strategy.validate_update(obj, old)?;
    if !errors.is_empty() {
        tracing::debug!(kind = %obj.object_kind(), errors = %errors, "update rejected");
        return Err(invalid(obj, errors));
    }

    strategy.canonicalize(obj)
}

/// Whether `obj` may be deleted gracefully
pub fn before_delete(
    strategy: &dyn DynStrategy,
    obj: &dyn Object,
    options: &DeleteOptions,
) -> Result<bool> {
    strategy.check_graceful_delete(obj, options)
}

/// Update `obj` if `old` exists, otherwise create it when the strategy allows
pub fn update_or_create(
    strategy: &dyn DynStrategy,
    ctx: &RequestContext,
    obj: &mut dyn Object,
    old: Option<&dyn Object>,
    names: &dyn NameGenerator,
) -> Result<Operation> {
    match old {
        Some(old) => {
            before_update(strategy, ctx, obj, old)?;
            Ok(Operation::Updated)
        }
        None if strategy.allow_create_on_update() => {
            before_create(strategy, ctx, obj, names)?;
            Ok(Operation::Created)
        }
        None => Err(ApiError::NotFound {
            kind: obj.object_kind(),
            name: display_name(obj.object_meta()),
        }),
    }
}

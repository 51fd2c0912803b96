//! Route lifecycle strategies
//!
//! [`RouteStrategy`] serves the main resource: it clears client-supplied status on
//! create, allocates a host when none is given, and keeps the stored host when an
//! update leaves it empty. [`RouteStatusStrategy`] serves the `status` subresource
//! and lets an update change nothing but status.

use std::fmt;
use std::sync::Arc;

use portcullis_core::object::downcast_ref;
use portcullis_core::{
    ApiError, DeleteOptions, ErrorList, ErrorReporter, Object, RestStrategy, Result,
    SelectionPredicate, TracingErrorReporter, fields, labels,
};

use crate::allocation::{AllocationError, RouteAllocator};
use crate::api::{
    HOST_GENERATED_ANNOTATION_KEY, Route, RouteStatus, WildcardPolicy, to_selectable_fields,
};
use crate::validation::{validate_route, validate_route_status_update, validate_route_update};

/// Hooks governing Route create and update
#[derive(Clone)]
pub struct RouteStrategy {
    allocator: Option<Arc<dyn RouteAllocator>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl RouteStrategy {
    /// Strategy with an optional host allocator
    ///
    /// Without an allocator, routes created without a host keep an empty host.
    pub fn new(allocator: Option<Arc<dyn RouteAllocator>>) -> Self {
        Self {
            allocator,
            reporter: Arc::new(TracingErrorReporter),
        }
    }

    /// Replace the sink that receives allocation failures
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn has_allocator(&self) -> bool {
        self.allocator.is_some()
    }

    /// Generate a host for `route` if it needs one
    ///
    /// Routes with a `Subdomain` wildcard policy, routes that already have a host,
    /// and strategies without an allocator are left alone.
    pub fn allocate_host(&self, route: &mut Route) -> Result<()> {
        if route.spec.wildcard_policy == WildcardPolicy::Subdomain {
            return Ok(());
        }
        let Some(allocator) = &self.allocator else {
            return Ok(());
        };
        if !route.spec.host.is_empty() {
            return Ok(());
        }

        let shard = allocator.allocate_router_shard(route).map_err(|e| match &e {
            AllocationError::NoShards { .. } => {
                ApiError::internal(format!("allocation error: {e}"))
            }
            _ => ApiError::internal(format!(
                "allocation error: {e} for route: {}/{}",
                route.namespace(),
                route.name()
            )),
        })?;
        route.spec.host = allocator.generate_hostname(route, &shard);
        route
            .metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(HOST_GENERATED_ANNOTATION_KEY.to_string(), "true".to_string());

        tracing::info!(
            route = %format!("{}/{}", route.namespace(), route.name()),
            shard = %shard.shard_name,
            host = %route.spec.host,
            "generated route host"
        );
        Ok(())
    }
}

impl Default for RouteStrategy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteStrategy")
            .field("allocator", &self.allocator.is_some())
            .finish_non_exhaustive()
    }
}

impl RestStrategy for RouteStrategy {
    type Object = Route;

    fn namespace_scoped(&self) -> bool {
        true
    }

    fn allow_create_on_update(&self) -> bool {
        false
    }

    fn allow_unconditional_update(&self) -> bool {
        false
    }

    fn prepare_for_create(&self, route: &mut Route) {
        route.status = RouteStatus::default();
        // Best effort: the route is still created, with an empty host
        if let Err(err) = self.allocate_host(route) {
            self.reporter.report(&err);
        }
    }

    fn prepare_for_update(&self, route: &mut Route, old: &Route) {
        route.status = old.status.clone();

        // An empty host on update means "unchanged"
        if route.spec.host.is_empty() && !old.spec.host.is_empty() {
            tracing::debug!(host = %old.spec.host, "keeping stored route host");
            route.spec.host = old.spec.host.clone();
        }
    }

    fn validate(&self, route: &Route) -> ErrorList {
        validate_route(route)
    }

    fn validate_update(&self, route: &Route, old: &Route) -> ErrorList {
        validate_route_update(route, old)
    }

    fn canonicalize(&self, _route: &mut Route) {}

    fn check_graceful_delete(&self, _route: &Route, _options: &DeleteOptions) -> bool {
        false
    }
}

/// Hooks for the Route `status` subresource
///
/// Wraps a [`RouteStrategy`] and delegates to it, except that an update keeps the
/// stored spec and is checked with the status rules.
#[derive(Debug, Clone, Default)]
pub struct RouteStatusStrategy {
    base: RouteStrategy,
}

impl RouteStatusStrategy {
    /// Status strategy over a base strategy without an allocator
    pub fn new() -> Self {
        Self {
            base: RouteStrategy::new(None),
        }
    }

    pub fn base(&self) -> &RouteStrategy {
        &self.base
    }
}

impl RestStrategy for RouteStatusStrategy {
    type Object = Route;

    fn namespace_scoped(&self) -> bool {
        self.base.namespace_scoped()
    }

    fn allow_create_on_update(&self) -> bool {
        self.base.allow_create_on_update()
    }

    fn allow_unconditional_update(&self) -> bool {
        self.base.allow_unconditional_update()
    }

    fn prepare_for_create(&self, route: &mut Route) {
        self.base.prepare_for_create(route);
    }

    fn prepare_for_update(&self, route: &mut Route, old: &Route) {
        if route.spec != old.spec {
            tracing::debug!(route = route.name(), "discarding spec changes on status update");
        }
        route.spec = old.spec.clone();
    }

    fn validate(&self, route: &Route) -> ErrorList {
        self.base.validate(route)
    }

    fn validate_update(&self, route: &Route, old: &Route) -> ErrorList {
        validate_route_status_update(route, old)
    }

    fn canonicalize(&self, route: &mut Route) {
        self.base.canonicalize(route);
    }

    fn check_graceful_delete(&self, route: &Route, options: &DeleteOptions) -> bool {
        self.base.check_graceful_delete(route, options)
    }
}

/// Label and field projection of a Route
pub fn get_attrs(obj: &dyn Object) -> Result<(labels::Set, fields::Set)> {
    let route = downcast_ref::<Route>(obj)?;
    Ok((
        labels::Set::from(route.metadata.labels.as_ref()),
        to_selectable_fields(route),
    ))
}

/// Selection predicate over Routes
pub fn matcher(label: labels::Selector, field: fields::Selector) -> SelectionPredicate {
    SelectionPredicate::new(label, field, get_attrs)
}

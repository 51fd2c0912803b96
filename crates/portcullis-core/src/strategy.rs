//! Lifecycle strategy contract
//!
//! Every managed kind supplies one [`RestStrategy`]: a stateless policy object that
//! normalizes and validates client-submitted objects before they reach storage.
//! Strategies never call their own hooks; the request pipeline does, in a fixed
//! order:
//!
//! ```text
//! create:  prepare_for_create ──► validate ──► canonicalize
//! update:  prepare_for_update ──► validate_update ──► canonicalize
//! ```
//!
//! [`DynStrategy`] is the type-erased form used where kinds are only known at
//! runtime. Wrap a strategy in [`Erased`] to get one.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::DeleteOptions;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::field::ErrorList;
use crate::object::{Object, downcast_mut, downcast_ref};

/// Per-kind lifecycle hooks
///
/// Implementations must be cheap to share: they are built once at startup and used
/// concurrently for unrelated objects.
pub trait RestStrategy: Send + Sync {
    /// The kind this strategy governs
    type Object: Object;

    /// Whether objects of this kind live in a namespace
    fn namespace_scoped(&self) -> bool;

    /// Whether an update of a missing object may create it
    fn allow_create_on_update(&self) -> bool;

    /// Whether an update may skip the resource-version precondition
    fn allow_unconditional_update(&self) -> bool;

    /// Strip or normalize fields a client may not set on create
    ///
    /// Must be idempotent.
    fn prepare_for_create(&self, obj: &mut Self::Object);

    /// Enforce immutability and monotonicity against the stored object
    fn prepare_for_update(&self, obj: &mut Self::Object, old: &Self::Object);

    /// Field errors that block creation; empty means acceptable
    fn validate(&self, obj: &Self::Object) -> ErrorList;

    /// Field errors that block the update; empty means acceptable
    fn validate_update(&self, obj: &Self::Object, old: &Self::Object) -> ErrorList;

    /// Post-validation normalization
    fn canonicalize(&self, obj: &mut Self::Object);

    /// Whether deletion may be deferred
    fn check_graceful_delete(&self, obj: &Self::Object, options: &DeleteOptions) -> bool;
}

/// Object-safe counterpart of [`RestStrategy`]
///
/// Every hook checks the kind of the object it is handed and fails with
/// [`ApiError::TypeMismatch`] rather than ignoring a miswired call.
pub trait DynStrategy: Send + Sync {
    fn kind(&self) -> String;

    fn namespace_scoped(&self) -> bool;

    fn allow_create_on_update(&self) -> bool;

    fn allow_unconditional_update(&self) -> bool;

    fn prepare_for_create(&self, obj: &mut dyn Object) -> Result<()>;

    fn prepare_for_update(&self, obj: &mut dyn Object, old: &dyn Object) -> Result<()>;

    fn validate(&self, obj: &dyn Object) -> Result<ErrorList>;

    fn validate_update(&self, obj: &dyn Object, old: &dyn Object) -> Result<ErrorList>;

    fn canonicalize(&self, obj: &mut dyn Object) -> Result<()>;

    fn check_graceful_delete(&self, obj: &dyn Object, options: &DeleteOptions) -> Result<bool>;
}

/// Adapts a typed strategy to [`DynStrategy`]
#[derive(Debug, Clone, Default)]
pub struct Erased<S>(S);

impl<S: RestStrategy> Erased<S> {
    pub fn new(strategy: S) -> Self {
        Self(strategy)
    }
}

impl<S: RestStrategy> DynStrategy for Erased<S> {
    fn kind(&self) -> String {
        <S::Object as Object>::static_kind()
    }

    fn namespace_scoped(&self) -> bool {
        self.0.namespace_scoped()
    }

    fn allow_create_on_update(&self) -> bool {
        self.0.allow_create_on_update()
    }

    fn allow_unconditional_update(&self) -> bool {
        self.0.allow_unconditional_update()
    }

    fn prepare_for_create(&self, obj: &mut dyn Object) -> Result<()> {
        let obj = downcast_mut::<S::Object>(obj)?;
        self.0.prepare_for_create(obj);
        Ok(())
    }

    fn prepare_for_update(&self, obj: &mut dyn Object, old: &dyn Object) -> Result<()> {
        let old = downcast_ref::<S::Object>(old)?;
        let obj = downcast_mut::<S::Object>(obj)?;
        self.0.prepare_for_update(obj, old);
        Ok(())
    }

    fn validate(&self, obj: &dyn Object) -> Result<ErrorList> {
        Ok(self.0.validate(downcast_ref::<S::Object>(obj)?))
    }

    fn validate_update(&self, obj: &dyn Object, old: &dyn Object) -> Result<ErrorList> {
        let old = downcast_ref::<S::Object>(old)?;
        let obj = downcast_ref::<S::Object>(obj)?;
        Ok(self.0.validate_update(obj, old))
    }

    fn canonicalize(&self, obj: &mut dyn Object) -> Result<()> {
        self.0.canonicalize(downcast_mut::<S::Object>(obj)?);
        Ok(())
    }

    fn check_graceful_delete(&self, obj: &dyn Object, options: &DeleteOptions) -> Result<bool> {
        let obj = downcast_ref::<S::Object>(obj)?;
        Ok(self.0.check_graceful_delete(obj, options))
    }
}

/// Erase a strategy into a shareable trait object
pub fn erase<S: RestStrategy + 'static>(strategy: S) -> Arc<dyn DynStrategy> {
    Arc::new(Erased::new(strategy))
}

/// Strategies keyed by kind and optional subresource (e.g. `status`)
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<(String, Option<String>), Arc<dyn DynStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the main strategy for its kind
    pub fn register(&mut self, strategy: Arc<dyn DynStrategy>) -> &mut Self {
        self.strategies.insert((strategy.kind(), None), strategy);
        self
    }

    /// Register a strategy serving a subresource of its kind
    pub fn register_subresource(
        &mut self,
        subresource: &str,
        strategy: Arc<dyn DynStrategy>,
    ) -> &mut Self {
        self.strategies
            .insert((strategy.kind(), Some(subresource.to_string())), strategy);
        self
    }

    /// Look up the strategy for `kind` (and `subresource`, if any)
    pub fn get(&self, kind: &str, subresource: Option<&str>) -> Result<Arc<dyn DynStrategy>> {
        self.strategies
            .get(&(kind.to_string(), subresource.map(str::to_string)))
            .cloned()
            .ok_or_else(|| match subresource {
                Some(sub) => ApiError::BadRequest(format!(
                    "no strategy registered for {kind}/{sub}"
                )),
                None => ApiError::BadRequest(format!("no strategy registered for kind {kind}")),
            })
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.strategies.keys().map(|(k, _)| k.clone()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::WidgetStrategy;
    use super::*;
    use crate::object::testing::{Gadget, widget};

    #[test]
    fn test_erased_runs_typed_hooks() {
        let strategy = Erased::new(WidgetStrategy);
        let mut w = widget("ns", "a");
        w.size = -4;

        DynStrategy::prepare_for_create(&strategy, &mut w).unwrap();
        assert_eq!(w.size, 0);
        assert!(DynStrategy::validate(&strategy, &w).unwrap().is_empty());
        assert_eq!(DynStrategy::kind(&strategy), "Widget");
    }

    #[test]
    fn test_erased_rejects_foreign_kind() {
        let strategy = erase(WidgetStrategy);
        let mut g = Gadget::default();

        let err = strategy.prepare_for_create(&mut g).unwrap_err();
        assert!(matches!(err, ApiError::TypeMismatch { .. }));

        let old = widget("ns", "a");
        let err = strategy.prepare_for_update(&mut g, &old).unwrap_err();
        assert!(matches!(err, ApiError::TypeMismatch { .. }));

        let err = strategy
            .check_graceful_delete(&g, &DeleteOptions::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::TypeMismatch { .. }));
    }

    #[test]
    fn test_erased_update_checks_old_kind_too() {
        let strategy = erase(WidgetStrategy);
        let mut w = widget("ns", "a");
        let err = strategy.validate_update(&w, &Gadget::default()).unwrap_err();
        assert!(matches!(err, ApiError::TypeMismatch { .. }));
        assert!(strategy.canonicalize(&mut w).is_ok());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = StrategyRegistry::new();
        registry
            .register(erase(WidgetStrategy))
            .register_subresource("status", erase(WidgetStrategy));

        assert!(registry.get("Widget", None).is_ok());
        assert!(registry.get("Widget", Some("status")).is_ok());
        assert_eq!(registry.kinds(), vec!["Widget".to_string()]);

        match registry.get("Gadget", None) {
            Err(err) => assert_eq!(err.to_string(), "no strategy registered for kind Gadget"),
            Ok(_) => panic!("Gadget has no strategy"),
        }
    }
}

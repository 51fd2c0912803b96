//! Portcullis Core - shared machinery for resource lifecycle strategies
//!
//! This crate provides:
//! - **Object model**: type-erased [`Object`] view over any `kube::Resource`
//! - **Field errors**: structured, ordered validation results ([`ErrorList`])
//! - **Selection**: label/field sets, selectors, and [`SelectionPredicate`]
//! - **Strategies**: the [`RestStrategy`] hook contract and its erased form
//! - **Pipeline**: create/update drivers that own the hook invocation order
//! - **Collaborators**: name generation and non-fatal error reporting

pub mod error;
pub mod field;
pub mod fields;
pub mod labels;
pub mod names;
pub mod object;
pub mod pipeline;
pub mod predicate;
pub mod report;
pub mod strategy;
pub mod validation;

pub use error::{ApiError, Result};
pub use field::{ErrorList, ErrorType, FieldError, Path};
pub use names::{NameGenerator, SimpleNameGenerator};
pub use object::{Object, downcast_mut, downcast_ref};
pub use pipeline::{
    Operation, RequestContext, before_create, before_delete, before_update, update_or_create,
};
pub use predicate::{AttrFunc, SelectionPredicate};
pub use report::{ErrorReporter, RecordingErrorReporter, TracingErrorReporter};
pub use strategy::{DynStrategy, Erased, RestStrategy, StrategyRegistry, erase};

/// Re-exported so kinds and callers agree on one `DeleteOptions`
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{DeleteOptions, ObjectMeta};

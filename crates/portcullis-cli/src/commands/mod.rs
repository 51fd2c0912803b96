//! CLI commands

pub mod create;
pub mod matching;
pub mod update;

use portcullis_core::RequestContext;

/// Request context for an optional `--namespace`
pub fn request_context(namespace: Option<&str>) -> RequestContext {
    match namespace {
        Some(ns) if !ns.is_empty() => RequestContext::with_namespace(ns),
        _ => RequestContext::new(),
    }
}

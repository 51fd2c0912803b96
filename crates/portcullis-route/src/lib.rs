//! Portcullis Route - lifecycle strategies for Route objects
//!
//! - [`RouteStrategy`] resets status on create and generates a host through an
//!   optional [`RouteAllocator`]
//! - [`RouteStatusStrategy`] serves the `status` subresource, where `spec` is frozen
//! - [`SimpleAllocator`] is the stock single-shard allocator

pub mod allocation;
pub mod api;
pub mod strategy;
pub mod validation;

pub use allocation::{AllocationError, RouteAllocator, RouterShard, SimpleAllocator};
pub use api::{HOST_GENERATED_ANNOTATION_KEY, Route, RouteSpec, RouteStatus, WildcardPolicy};
pub use strategy::{RouteStatusStrategy, RouteStrategy, get_attrs, matcher};
pub use validation::{validate_route, validate_route_status_update, validate_route_update};

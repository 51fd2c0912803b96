//! Route host allocation
//!
//! Allocation happens in two steps: pick a router shard for the route, then derive a
//! hostname from the route and that shard. Only the first step can fail.

use portcullis_core::validation::is_dns1123_subdomain;
use thiserror::Error;

use crate::api::Route;

/// DNS suffix used when none is configured
pub const DEFAULT_DNS_SUFFIX: &str = "router.default.svc.cluster.local";

/// Shard name used when none is configured
pub const DEFAULT_SHARD_NAME: &str = "default";

/// Errors from a route allocator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no router shard available for route {namespace}/{name}")]
    NoShards { namespace: String, name: String },

    #[error("invalid DNS suffix {suffix:?}: {reason}")]
    InvalidSuffix { suffix: String, reason: String },

    #[error("allocator plugin failed: {0}")]
    Plugin(String),
}

pub type Result<T> = std::result::Result<T, AllocationError>;

/// A set of routers sharing a DNS suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterShard {
    pub shard_name: String,
    pub dns_suffix: String,
}

/// Picks a shard for a route and generates its hostname
pub trait RouteAllocator: Send + Sync {
    fn allocate_router_shard(&self, route: &Route) -> Result<RouterShard>;

    fn generate_hostname(&self, route: &Route, shard: &RouterShard) -> String;
}

/// Single-shard allocator producing `<name>-<namespace>.<suffix>`
#[derive(Debug, Clone)]
pub struct SimpleAllocator {
    shard: RouterShard,
}

impl SimpleAllocator {
    /// Allocator for one shard under `dns_suffix`
    ///
    /// An empty suffix falls back to [`DEFAULT_DNS_SUFFIX`].
    pub fn new(shard_name: &str, dns_suffix: &str) -> Result<Self> {
        let dns_suffix = if dns_suffix.is_empty() {
            DEFAULT_DNS_SUFFIX
        } else {
            dns_suffix
        };
        if let Some(reason) = is_dns1123_subdomain(dns_suffix).into_iter().next() {
            return Err(AllocationError::InvalidSuffix {
                suffix: dns_suffix.to_string(),
                reason,
            });
        }
        let shard_name = if shard_name.is_empty() {
            DEFAULT_SHARD_NAME
        } else {
            shard_name
        };
        Ok(Self {
            shard: RouterShard {
                shard_name: shard_name.to_string(),
                dns_suffix: dns_suffix.to_string(),
            },
        })
    }

    pub fn shard(&self) -> &RouterShard {
        &self.shard
    }
}

impl Default for SimpleAllocator {
    fn default() -> Self {
        Self {
            shard: RouterShard {
                shard_name: DEFAULT_SHARD_NAME.to_string(),
                dns_suffix: DEFAULT_DNS_SUFFIX.to_string(),
            },
        }
    }
}

impl RouteAllocator for SimpleAllocator {
    fn allocate_router_shard(&self, route: &Route) -> Result<RouterShard> {
        tracing::debug!(
            route = %format!("{}/{}", route.namespace(), route.name()),
            shard = %self.shard.shard_name,
            "allocating router shard"
        );
        Ok(self.shard.clone())
    }

    fn generate_hostname(&self, route: &Route, shard: &RouterShard) -> String {
        let name = route.name().replace('.', "-");
        let namespace = route.namespace();
        if name.is_empty() || namespace.is_empty() {
            return String::new();
        }
        format!("{name}-{namespace}.{}", shard.dns_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suffix() {
        let allocator = SimpleAllocator::new("", "").unwrap();
        assert_eq!(allocator.shard().dns_suffix, DEFAULT_DNS_SUFFIX);
        assert_eq!(allocator.shard().shard_name, DEFAULT_SHARD_NAME);
    }

    #[test]
    fn test_invalid_suffix_rejected() {
        let err = SimpleAllocator::new("main", "Not_A.Domain").unwrap_err();
        assert!(matches!(err, AllocationError::InvalidSuffix { .. }));
    }

    #[test]
    fn test_generate_hostname() {
        let allocator = SimpleAllocator::new("main", "apps.example.com").unwrap();
        let route = Route::new("shop", "front.end");
        let shard = allocator.allocate_router_shard(&route).unwrap();

        assert_eq!(shard.shard_name, "main");
        assert_eq!(
            allocator.generate_hostname(&route, &shard),
            "front-end-shop.apps.example.com"
        );
    }

    #[test]
    fn test_generate_hostname_needs_name_and_namespace() {
        let allocator = SimpleAllocator::default();
        let mut route = Route::new("shop", "front");
        route.metadata.name = None;
        let shard = allocator.allocate_router_shard(&route).unwrap();
        assert_eq!(allocator.generate_hostname(&route, &shard), "");
    }
}

//! Route API types
//!
//! A Route exposes a service under a hostname. `spec.host` may be supplied by the
//! user or generated by an allocator; `status` is written only by routers.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::Resource;
use portcullis_core::fields;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// API group of route resources
pub const GROUP: &str = "route.openshift.io";

/// API version of route resources
pub const VERSION: &str = "v1";

/// Annotation set to `"true"` when the route's host was generated
pub const HOST_GENERATED_ANNOTATION_KEY: &str = "openshift.io/host.generated";

fn default_api_version() -> String {
    format!("{GROUP}/{VERSION}")
}

fn default_kind() -> String {
    "Route".to_string()
}

fn default_target_kind() -> String {
    "Service".to_string()
}

// =============================================================================
// SPEC
// =============================================================================

/// Whether the host takes part in subdomain wildcard matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardPolicy {
    #[default]
    None,
    Subdomain,
}

/// Backend a route sends traffic to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    #[serde(default = "default_target_kind")]
    pub kind: String,

    #[serde(default)]
    pub name: String,

    /// Relative share of traffic; `None` means the default weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

impl Default for RouteTargetReference {
    fn default() -> Self {
        Self {
            kind: default_target_kind(),
            name: String::new(),
            weight: None,
        }
    }
}

impl RouteTargetReference {
    pub fn service(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: IntOrString,
}

/// Where TLS is terminated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsTermination {
    #[default]
    Edge,
    Passthrough,
    Reencrypt,
}

/// What to do with plain HTTP traffic on a TLS route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsecureEdgeTerminationPolicy {
    None,
    Allow,
    Redirect,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    #[serde(default)]
    pub termination: TlsTermination,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_certificate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_ca_certificate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_edge_termination_policy: Option<InsecureEdgeTerminationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Public hostname; empty until allocated unless supplied
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default)]
    pub to: RouteTargetReference,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_backends: Vec<RouteTargetReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<RoutePort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,

    #[serde(default)]
    pub wildcard_policy: WildcardPolicy,
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteIngressCondition {
    #[serde(rename = "type")]
    pub condition_type: String,

    pub status: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
}

/// Admission state of the route on one router
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteIngress {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub router_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<RouteIngressCondition>,

    #[serde(default)]
    pub wildcard_policy: WildcardPolicy,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub router_canonical_hostname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<RouteIngress>,
}

impl RouteStatus {
    pub fn is_empty(&self) -> bool {
        self.ingress.is_empty()
    }
}

// =============================================================================
// ROUTE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: RouteSpec,

    #[serde(default, skip_serializing_if = "RouteStatus::is_empty")]
    pub status: RouteStatus,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::default(),
            spec: RouteSpec::default(),
            status: RouteStatus::default(),
        }
    }
}

impl Route {
    /// A route in `namespace` pointing at the service `name`
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: RouteSpec {
                to: RouteTargetReference::service(name),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.spec.host = host.to_string();
        self
    }

    pub fn with_wildcard_policy(mut self, policy: WildcardPolicy) -> Self {
        self.spec.wildcard_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    /// Whether the host carries the generated-host marker
    pub fn host_generated(&self) -> bool {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(HOST_GENERATED_ANNOTATION_KEY))
            .is_some_and(|v| v == "true")
    }
}

impl Resource for Route {
    type DynamicType = ();
    type Scope = k8s_openapi::NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed("Route")
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(GROUP)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed("routes")
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Fields of a Route that list/watch queries may select on
pub fn to_selectable_fields(route: &Route) -> fields::Set {
    let mut set = fields::Set::new();
    set.insert("metadata.name", route.name());
    set.insert("metadata.namespace", route.namespace());
    set.insert("spec.host", route.spec.host.as_str());
    set.insert("spec.path", route.spec.path.as_str());
    set.insert("spec.to.name", route.spec.to.name.as_str());
    set
}

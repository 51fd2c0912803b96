//! BuildConfig API types
//!
//! A BuildConfig declares how to build an image and which events (triggers) start a
//! new build. `status.lastVersion` counts builds started from it and is owned by
//! the system.

use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use portcullis_core::fields;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// API group of build resources
pub const GROUP: &str = "build.openshift.io";

/// API version of build resources
pub const VERSION: &str = "v1";

fn default_api_version() -> String {
    format!("{GROUP}/{VERSION}")
}

fn default_kind() -> String {
    "BuildConfig".to_string()
}

// =============================================================================
// TRIGGER TYPES
// =============================================================================

/// Tag naming what event class a trigger reacts to
///
/// Open-ended on the wire: clients may send tags this server does not know, which
/// the strategy then drops.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildTriggerType(Cow<'static, str>);

impl BuildTriggerType {
    pub const GITHUB: Self = Self(Cow::Borrowed("GitHub"));
    pub const GENERIC: Self = Self(Cow::Borrowed("Generic"));
    pub const GITLAB: Self = Self(Cow::Borrowed("GitLab"));
    pub const BITBUCKET: Self = Self(Cow::Borrowed("Bitbucket"));
    pub const IMAGE_CHANGE: Self = Self(Cow::Borrowed("ImageChange"));
    pub const CONFIG_CHANGE: Self = Self(Cow::Borrowed("ConfigChange"));

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Membership test against [`KNOWN_TRIGGER_TYPES`]
    pub fn is_known(&self) -> bool {
        KNOWN_TRIGGER_TYPES.contains(&self.as_str())
    }

    /// Whether this trigger is fired by an incoming webhook
    pub fn is_webhook(&self) -> bool {
        matches!(self.as_str(), "GitHub" | "Generic" | "GitLab" | "Bitbucket")
    }
}

impl fmt::Display for BuildTriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildTriggerType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Trigger tags this server understands
pub const KNOWN_TRIGGER_TYPES: &[&str] = &[
    "GitHub",
    "Generic",
    "GitLab",
    "Bitbucket",
    "ImageChange",
    "ConfigChange",
];

// =============================================================================
// TRIGGERS
// =============================================================================

/// Webhook trigger settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebHookTrigger {
    /// Shared secret embedded in the webhook URL
    #[serde(default)]
    pub secret: String,

    /// Whether the payload may set build environment variables (generic only)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_env: bool,
}

/// Image change trigger settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeTrigger {
    /// Image that last fired this trigger
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_triggered_image_id: String,

    /// Image stream tag to watch; `None` watches the strategy's image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

/// One trigger declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerPolicy {
    #[serde(rename = "type", default)]
    pub trigger_type: BuildTriggerType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<WebHookTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<WebHookTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<WebHookTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitbucket: Option<WebHookTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change: Option<ImageChangeTrigger>,
}

impl BuildTriggerPolicy {
    /// A trigger carrying only its type tag
    pub fn of_type(trigger_type: impl Into<BuildTriggerType>) -> Self {
        Self {
            trigger_type: trigger_type.into(),
            ..Default::default()
        }
    }

    pub fn github(secret: &str) -> Self {
        Self {
            trigger_type: BuildTriggerType::GITHUB,
            github: Some(WebHookTrigger {
                secret: secret.to_string(),
                allow_env: false,
            }),
            ..Default::default()
        }
    }

    pub fn generic(secret: &str) -> Self {
        Self {
            trigger_type: BuildTriggerType::GENERIC,
            generic: Some(WebHookTrigger {
                secret: secret.to_string(),
                allow_env: false,
            }),
            ..Default::default()
        }
    }

    pub fn image_change(from: Option<ObjectReference>) -> Self {
        Self {
            trigger_type: BuildTriggerType::IMAGE_CHANGE,
            image_change: Some(ImageChangeTrigger {
                last_triggered_image_id: String::new(),
                from,
            }),
            ..Default::default()
        }
    }

    pub fn config_change() -> Self {
        Self::of_type(BuildTriggerType::CONFIG_CHANGE)
    }

    /// Webhook settings matching this trigger's type, if it is a webhook trigger
    pub fn webhook(&self) -> Option<&WebHookTrigger> {
        match self.trigger_type.as_str() {
            "GitHub" => self.github.as_ref(),
            "Generic" => self.generic.as_ref(),
            "GitLab" => self.gitlab.as_ref(),
            "Bitbucket" => self.bitbucket.as_ref(),
            _ => None,
        }
    }
}

// =============================================================================
// SPEC / STATUS
// =============================================================================

/// How concurrent builds of one config are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildRunPolicy {
    #[default]
    Serial,
    Parallel,
    SerialLatestOnly,
}

/// Git repository to build from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBuildSource {
    #[serde(default)]
    pub uri: String,

    #[serde(default, rename = "ref", skip_serializing_if = "String::is_empty")]
    pub git_ref: String,
}

/// Inputs of a build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitBuildSource>,

    /// Inline Dockerfile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context_dir: String,
}

impl BuildSource {
    pub fn has_input(&self) -> bool {
        self.git.is_some() || self.dockerfile.is_some()
    }
}

/// Build mechanism
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStrategyType {
    #[default]
    Docker,
    Source,
    Custom,
    JenkinsPipeline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    #[serde(rename = "type", default)]
    pub strategy_type: BuildStrategyType,

    /// Builder or base image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<ObjectReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    /// Ordered trigger declarations
    #[serde(default)]
    pub triggers: Vec<BuildTriggerPolicy>,

    #[serde(default)]
    pub run_policy: BuildRunPolicy,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_account: String,

    #[serde(default)]
    pub source: BuildSource,

    #[serde(default)]
    pub strategy: BuildStrategy,

    #[serde(default)]
    pub output: BuildOutput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_builds_history_limit: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_builds_history_limit: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigStatus {
    /// Number of the most recently started build; never decreases
    #[serde(default)]
    pub last_version: i64,
}

/// A build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: BuildConfigSpec,

    #[serde(default)]
    pub status: BuildConfigStatus,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::default(),
            spec: BuildConfigSpec::default(),
            status: BuildConfigStatus::default(),
        }
    }
}

impl BuildConfig {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_triggers(mut self, triggers: Vec<BuildTriggerPolicy>) -> Self {
        self.spec.triggers = triggers;
        self
    }

    pub fn with_last_version(mut self, last_version: i64) -> Self {
        self.status.last_version = last_version;
        self
    }
}

impl Resource for BuildConfig {
    type DynamicType = ();
    type Scope = k8s_openapi::NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed("BuildConfig")
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(GROUP)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed("buildconfigs")
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Fields of a BuildConfig that list/watch queries may select on
pub fn to_selectable_fields(bc: &BuildConfig) -> fields::Set {
    let mut set = fields::Set::new();
    set.insert("metadata.name", bc.metadata.name.clone().unwrap_or_default());
    set.insert(
        "metadata.namespace",
        bc.metadata.namespace.clone().unwrap_or_default(),
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_trigger_types() {
        assert!(BuildTriggerType::GENERIC.is_known());
        assert!(BuildTriggerType::new("ConfigChange").is_known());
        assert!(!BuildTriggerType::new("BogusType").is_known());
        assert!(!BuildTriggerType::default().is_known());
    }

    #[test]
    fn test_trigger_type_compares_by_content() {
        assert_eq!(BuildTriggerType::new("GitHub"), BuildTriggerType::GITHUB);
        assert!(BuildTriggerType::GITLAB.is_webhook());
        assert!(!BuildTriggerType::IMAGE_CHANGE.is_webhook());
    }

    #[test]
    fn test_webhook_lookup_follows_type() {
        let t = BuildTriggerPolicy::github("s3cr3t");
        assert_eq!(t.webhook().map(|w| w.secret.as_str()), Some("s3cr3t"));
        assert!(BuildTriggerPolicy::config_change().webhook().is_none());
    }

    #[test]
    fn test_selectable_fields() {
        let set = to_selectable_fields(&BuildConfig::new("proj", "app"));
        assert_eq!(set.get("metadata.name"), "app");
        assert_eq!(set.get("metadata.namespace"), "proj");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_deserialize_unknown_trigger_type() {
        let yaml = r#"
apiVersion: build.openshift.io/v1
kind: BuildConfig
metadata:
  name: app
  namespace: proj
spec:
  triggers:
    - type: Generic
      generic:
        secret: abc
    - type: BogusType
status:
  lastVersion: 4
"#;
        let bc: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bc.spec.triggers.len(), 2);
        assert_eq!(bc.spec.triggers[1].trigger_type.as_str(), "BogusType");
        assert_eq!(bc.status.last_version, 4);
        assert_eq!(bc.spec.run_policy, BuildRunPolicy::Serial);
    }
}

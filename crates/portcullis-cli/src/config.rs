//! CLI configuration
//!
//! Read from `~/.config/portcullis/config.yaml` unless `--config` names another file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use portcullis_build::BuildConfigStrategy;
use portcullis_core::{StrategyRegistry, erase};
use portcullis_route::{RouteAllocator, RouteStatusStrategy, RouteStrategy, SimpleAllocator};

use crate::error::{CliError, Result};

/// Configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Host allocation settings; absent means routes get no generated host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingConfig>,
}

/// Settings for the route host allocator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// DNS suffix appended to generated hosts
    #[serde(default)]
    pub subdomain: String,

    #[serde(default)]
    pub shard_name: String,
}

fn default_api_version() -> String {
    "portcullis.io/v1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            routing: None,
        }
    }
}

impl Config {
    /// Load `path` if given, else the default location, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Default configuration path, if a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("portcullis").join("config.yaml"))
    }

    /// Route allocator described by `routing`, if any
    pub fn allocator(&self) -> Result<Option<Arc<dyn RouteAllocator>>> {
        let Some(routing) = &self.routing else {
            return Ok(None);
        };
        if routing.subdomain.is_empty() {
            return Ok(None);
        }
        let allocator: Arc<dyn RouteAllocator> = Arc::new(
            SimpleAllocator::new(&routing.shard_name, &routing.subdomain)
                .map_err(|e| CliError::config(format!("routing: {e}")))?,
        );
        Ok(Some(allocator))
    }

    /// Strategies for every supported kind
    pub fn registry(&self) -> Result<StrategyRegistry> {
        let mut registry = StrategyRegistry::new();
        registry
            .register(erase(BuildConfigStrategy::new()))
            .register(erase(RouteStrategy::new(self.allocator()?)))
            .register_subresource("status", erase(RouteStatusStrategy::new()));
        Ok(registry)
    }
}

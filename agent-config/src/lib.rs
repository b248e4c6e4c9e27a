//! Configuration management for agent capability hosts.
//!
//! [`AgentConfig`] gathers the per-crate configuration structs into one
//! JSON document. Every section and field is optional; omitted values take
//! their defaults. Environment variables override file values.

#![warn(missing_docs, clippy::pedantic)]

use std::path::Path;
use std::sync::Arc;

use agent_memory::{VolatileConfig, VolatileMemory};
use agent_prompts::{PreloadConfig, PreloadMemoryTool, RenderMode};
use agent_tools::{
    CategoryPolicy, DiscoveryConfig, RegistryConfig, ToolDiscovery, ToolError, ToolRegistry,
};
use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Overrides [`DiscoveryConfig::max_results`].
pub const ENV_MAX_RESULTS: &str = "AGENT_DISCOVERY_MAX_RESULTS";
/// Overrides [`DiscoveryConfig::min_score`].
pub const ENV_MIN_SCORE: &str = "AGENT_DISCOVERY_MIN_SCORE";
/// Overrides [`RegistryConfig::category_policy`] (`retain_empty` or `prune_empty`).
pub const ENV_CATEGORY_POLICY: &str = "AGENT_CATEGORY_POLICY";
/// Overrides [`PreloadConfig::render_mode`] (`first_part` or `all_parts`).
pub const ENV_RENDER_MODE: &str = "AGENT_PRELOAD_RENDER_MODE";

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value `{value}` for {key}")]
    InvalidOverride {
        /// Environment variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The assembled configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] ToolError),
}

/// Aggregated runtime configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    registry: RegistryConfig,
    discovery: DiscoveryConfig,
    memory: VolatileConfig,
    preload: PreloadConfig,
}

impl AgentConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, parsed, or validated.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        let config = Self::from_json_str(&raw)
            .with_context(|| format!("loading configuration from {}", path.display()))?;
        debug!(path = %path.display(), "configuration file loaded");
        Ok(config.with_env_overrides()?)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AgentConfig::with_overrides`].
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides resolved through `lookup`, then re-validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for unparsable values and
    /// [`ConfigError::Invalid`] when the result fails validation.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_RESULTS) {
            let max_results = parse_number(ENV_MAX_RESULTS, value)?;
            self.discovery = self.discovery.with_max_results(max_results);
        }
        if let Some(value) = lookup(ENV_MIN_SCORE) {
            let min_score = parse_number(ENV_MIN_SCORE, value)?;
            self.discovery = self.discovery.with_min_score(min_score);
        }
        if let Some(value) = lookup(ENV_CATEGORY_POLICY) {
            let policy: CategoryPolicy = parse_label(ENV_CATEGORY_POLICY, value)?;
            self.registry = self.registry.with_category_policy(policy);
        }
        if let Some(value) = lookup(ENV_RENDER_MODE) {
            let mode: RenderMode = parse_label(ENV_RENDER_MODE, value)?;
            self.preload = PreloadConfig::new(mode);
        }
        self.validate()?;
        Ok(self)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the discovery section is invalid.
    pub fn validate(self) -> ConfigResult<()> {
        self.discovery.validate()?;
        Ok(())
    }

    /// Returns the registry section.
    #[must_use]
    pub const fn registry(self) -> RegistryConfig {
        self.registry
    }

    /// Returns the discovery section.
    #[must_use]
    pub const fn discovery(self) -> DiscoveryConfig {
        self.discovery
    }

    /// Returns the memory section.
    #[must_use]
    pub const fn memory(self) -> VolatileConfig {
        self.memory
    }

    /// Returns the preload section.
    #[must_use]
    pub const fn preload(self) -> PreloadConfig {
        self.preload
    }

    /// Creates an empty registry using the registry section.
    #[must_use]
    pub fn build_registry(self) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::with_config(self.registry))
    }

    /// Creates a discovery handle over `registry` using the discovery section.
    #[must_use]
    pub fn build_discovery(self, registry: Arc<ToolRegistry>) -> ToolDiscovery {
        ToolDiscovery::with_config(registry, self.discovery)
    }

    /// Creates an empty volatile memory store using the memory section.
    #[must_use]
    pub fn build_memory(self) -> VolatileMemory {
        VolatileMemory::new(self.memory)
    }

    /// Creates the memory preload tool using the preload section.
    #[must_use]
    pub fn build_preload_tool(self) -> PreloadMemoryTool {
        PreloadMemoryTool::with_config(self.preload)
    }
}

fn parse_number(key: &'static str, value: String) -> ConfigResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { key, value })
}

fn parse_label<T: DeserializeOwned>(key: &'static str, value: String) -> ConfigResult<T> {
    serde_json::from_value(Value::String(value.trim().to_owned()))
        .map_err(|_| ConfigError::InvalidOverride { key, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::num::NonZeroUsize;

    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = AgentConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.discovery().max_results(), 5);
        assert_eq!(config.registry().category_policy(), CategoryPolicy::RetainEmpty);
        assert_eq!(config.preload().render_mode(), RenderMode::AllParts);
        assert_eq!(config.memory().capacity().get(), 256);
    }

    #[test]
    fn sections_are_parsed() {
        let config = AgentConfig::from_json_str(
            r#"{
                "registry": { "category_policy": "prune_empty" },
                "discovery": { "max_results": 3, "min_score": 1 },
                "memory": { "capacity": 16 },
                "preload": { "render_mode": "first_part" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.registry().category_policy(), CategoryPolicy::PruneEmpty);
        assert_eq!(config.discovery().max_results(), 3);
        assert_eq!(config.discovery().min_score(), 1);
        assert_eq!(config.memory().capacity(), NonZeroUsize::new(16).unwrap());
        assert_eq!(config.preload().render_mode(), RenderMode::FirstPart);
    }

    #[test]
    fn invalid_documents_are_rejected() {
        let err = AgentConfig::from_json_str(r#"{ "discovery": { "max_results": 0 } }"#)
            .expect_err("zero max_results");
        assert!(matches!(err, ConfigError::Invalid(ToolError::InvalidConfig(_))));

        let err = AgentConfig::from_json_str(r#"{ "memory": { "capacity": 0 } }"#)
            .expect_err("zero capacity");
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = AgentConfig::from_json_str(r#"{ "unknown": true }"#).expect_err("unknown field");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = AgentConfig::default()
            .with_overrides(overrides(&[
                (ENV_MAX_RESULTS, "2"),
                (ENV_MIN_SCORE, " 1 "),
                (ENV_CATEGORY_POLICY, "prune_empty"),
                (ENV_RENDER_MODE, "first_part"),
            ]))
            .unwrap();

        assert_eq!(config.discovery().max_results(), 2);
        assert_eq!(config.discovery().min_score(), 1);
        assert_eq!(config.registry().category_policy(), CategoryPolicy::PruneEmpty);
        assert_eq!(config.preload().render_mode(), RenderMode::FirstPart);
    }

    #[test]
    fn bad_overrides_are_reported() {
        let err = AgentConfig::default()
            .with_overrides(overrides(&[(ENV_MAX_RESULTS, "many")]))
            .expect_err("non-numeric");
        assert!(matches!(
            err,
            ConfigError::InvalidOverride { key: ENV_MAX_RESULTS, .. }
        ));

        let err = AgentConfig::default()
            .with_overrides(overrides(&[(ENV_CATEGORY_POLICY, "sometimes")]))
            .expect_err("unknown policy");
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));

        let err = AgentConfig::default()
            .with_overrides(overrides(&[(ENV_MAX_RESULTS, "0")]))
            .expect_err("zero after override");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn builders_apply_sections() {
        let config = AgentConfig::from_json_str(
            r#"{ "registry": { "category_policy": "prune_empty" }, "discovery": { "max_results": 1 } }"#,
        )
        .unwrap();
        let registry = config.build_registry();
        assert_eq!(registry.config().category_policy(), CategoryPolicy::PruneEmpty);
        let discovery = config.build_discovery(Arc::clone(&registry));
        assert_eq!(discovery.config().max_results(), 1);
        assert_eq!(config.build_preload_tool().config(), config.preload());
    }
}

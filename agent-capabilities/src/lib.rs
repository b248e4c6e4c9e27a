//! Capability injection for agent runtimes.
//!
//! Bundles the workspace crates behind feature flags: the tool registry and
//! discovery engine, conversation memory, memory preload, configuration, and
//! tracing setup.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use agent_primitives as primitives;

/// Tool registry and discovery (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use agent_tools as tools;

/// Conversation memory (enabled by `memory` feature).
#[cfg(feature = "memory")]
pub use agent_memory as memory;

/// Memory preload and request assembly (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use agent_prompts as prompts;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use agent_telemetry as telemetry;

/// Configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use agent_config as config;

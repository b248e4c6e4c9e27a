//! Tool registration and task-driven discovery.
//!
//! Providers describe how to construct a tool from a [`ParameterSchema`]. The
//! [`ToolRegistry`] indexes providers by declared name and by category, and
//! [`ToolDiscovery`] ranks registered providers against a free-text task
//! description using word overlap.

#![warn(missing_docs, clippy::pedantic)]

pub mod discovery;
pub mod error;
pub mod provider;
pub mod registry;
pub mod schema;

pub use discovery::{CandidateScore, DiscoveryConfig, ToolDiscovery};
pub use error::{ToolError, ToolResult};
pub use provider::{FnToolProvider, Tool, ToolDescriptor, ToolProvider};
pub use registry::{CategoryPolicy, ProviderEntry, RegistryConfig, ToolRegistry};
pub use schema::{ParamKind, ParamSpec, ParameterSchema, ToolArgs};

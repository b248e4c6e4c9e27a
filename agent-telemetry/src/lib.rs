//! Observability utilities for agent capability hosts.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support;

pub use tracing_support::{DEFAULT_DIRECTIVE, init_tracing};

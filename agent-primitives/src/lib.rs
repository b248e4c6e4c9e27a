//! Core shared types for agent capability crates.

#![warn(missing_docs, clippy::pedantic)]

mod content;
mod error;

/// Conversation content exchanged between users, models, and tools.
pub use content::{Blob, Content, FunctionCall, FunctionResponse, Part};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};

//! Prompt assembly for agent requests.
//!
//! The [`preload`] module renders retrieved memories into an instruction block
//! and injects it into an [`LlmRequest`] ahead of model invocation.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod preload;
pub mod request;

pub use error::{PromptError, PromptResult};
pub use preload::{PreloadConfig, PreloadMemoryTool, RenderMode, format_memories};
pub use request::LlmRequest;

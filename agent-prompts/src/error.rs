//! Error types for prompt assembly.

use agent_memory::MemoryError;
use thiserror::Error;

/// Result alias for prompt operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors raised while assembling prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The memory backend failed while answering a search.
    #[error("memory lookup failed: {source}")]
    Memory {
        /// Source error reported by the memory service.
        #[from]
        source: MemoryError,
    },
}

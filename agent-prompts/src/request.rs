//! Outgoing model request state that preload steps append instructions to.

use serde::{Deserialize, Serialize};

/// Instruction set sent alongside a model request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmRequest {
    #[serde(default)]
    instructions: Vec<String>,
}

impl LlmRequest {
    /// Creates a request with no instructions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends instructions after any already present.
    pub fn append_instructions<I, S>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions
            .extend(instructions.into_iter().map(Into::into));
    }

    /// Returns the instructions in insertion order.
    #[must_use]
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Joins every instruction into a single system prompt.
    #[must_use]
    pub fn system_instruction(&self) -> String {
        self.instructions.join("\n\n")
    }
}

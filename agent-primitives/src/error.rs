//! Shared error definitions for agent primitives.

use thiserror::Error;

/// Result alias used throughout the agent primitives.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// A content part failed validation.
    #[error("invalid content part: {reason}")]
    InvalidPart {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A content role label failed validation.
    #[error("invalid content role `{role}`")]
    InvalidRole {
        /// The offending role label.
        role: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidPart`] from the supplied reason.
    #[must_use]
    pub fn invalid_part(reason: impl Into<String>) -> Self {
        Self::InvalidPart {
            reason: reason.into(),
        }
    }
}

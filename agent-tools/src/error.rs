//! Errors produced by tool construction and discovery configuration.

use thiserror::Error;

use crate::schema::ParamKind;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool providers and discovery configuration.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A construction argument required by the provider was not supplied.
    #[error("missing argument `{name}`")]
    MissingArgument {
        /// Name of the missing parameter.
        name: String,
    },

    /// A construction argument had the wrong type.
    #[error("argument `{name}` must be {expected}")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: String,
        /// Kind the provider expected.
        expected: ParamKind,
    },

    /// The provider rejected the supplied arguments.
    #[error("tool construction failed: {reason}")]
    Construction {
        /// Human-readable reason returned by the provider.
        reason: String,
    },

    /// Requested tool does not exist.
    #[error("tool `{name}` is not registered")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// Discovery or registry configuration failed validation.
    #[error("invalid tool configuration: {0}")]
    InvalidConfig(&'static str),
}

impl ToolError {
    /// Creates a construction error from the supplied reason.
    #[must_use]
    pub fn construction(reason: impl Into<String>) -> Self {
        Self::Construction {
            reason: reason.into(),
        }
    }
}

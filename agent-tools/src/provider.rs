//! Tool instances and the providers that construct them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ToolResult;
use crate::schema::{ParameterSchema, ToolArgs};

/// A live capability instance handed to the caller.
pub trait Tool: Send + Sync {
    /// Declared name of the tool.
    fn name(&self) -> &str;

    /// Human-readable description used for discovery scoring.
    fn description(&self) -> &str;
}

/// Constructs tool instances from named arguments.
///
/// Providers are registered once and asked for fresh instances on every
/// registration probe and every discovery request. `build` runs on the calling
/// thread and must not block on I/O.
pub trait ToolProvider: Send + Sync {
    /// Stable identifier of the provider type, used as the registry key when
    /// a default instance cannot be built.
    fn type_name(&self) -> &str;

    /// Parameters accepted by [`ToolProvider::build`].
    fn schema(&self) -> &ParameterSchema;

    /// Builds a tool from the supplied arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`](crate::ToolError) when an argument is missing,
    /// has the wrong type, or is otherwise rejected.
    fn build(&self, args: &ToolArgs) -> ToolResult<Box<dyn Tool>>;

    /// Builds a tool from arguments synthesised from [`ToolProvider::schema`].
    ///
    /// # Errors
    ///
    /// Propagates any error returned by [`ToolProvider::build`].
    fn try_build_default(&self) -> ToolResult<Box<dyn Tool>> {
        self.build(&self.schema().default_args())
    }
}

type Factory = dyn Fn(&ToolArgs) -> ToolResult<Box<dyn Tool>> + Send + Sync;

/// [`ToolProvider`] backed by a closure.
pub struct FnToolProvider {
    type_name: String,
    schema: ParameterSchema,
    factory: Box<Factory>,
}

impl FnToolProvider {
    /// Creates a provider from a type name, schema, and factory closure.
    #[must_use]
    pub fn new<F>(type_name: impl Into<String>, schema: ParameterSchema, factory: F) -> Self
    where
        F: Fn(&ToolArgs) -> ToolResult<Box<dyn Tool>> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            schema,
            factory: Box::new(factory),
        }
    }
}

impl fmt::Debug for FnToolProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnToolProvider")
            .field("type_name", &self.type_name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ToolProvider for FnToolProvider {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    fn build(&self, args: &ToolArgs) -> ToolResult<Box<dyn Tool>> {
        (self.factory)(args)
    }
}

/// Plain name/description pair.
///
/// Usable both as a minimal [`Tool`] and as a detached snapshot of another
/// tool's metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    name: String,
    description: String,
}

impl ToolDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Tool for ToolDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::schema::ParamKind;

    fn greeter() -> FnToolProvider {
        FnToolProvider::new(
            "Greeter",
            ParameterSchema::new().required("greeting", ParamKind::String),
            |args: &ToolArgs| -> ToolResult<Box<dyn Tool>> {
                let greeting = args.string("greeting")?;
                Ok(Box::new(ToolDescriptor::new(
                    "greeter",
                    format!("says {greeting}"),
                )))
            },
        )
    }

    #[test]
    fn default_build_uses_placeholders() {
        let tool = greeter().try_build_default().unwrap();
        assert_eq!(tool.name(), "greeter");
        assert_eq!(tool.description(), "says placeholder_greeting");
    }

    #[test]
    fn explicit_build_uses_supplied_arguments() {
        let provider = greeter();
        let tool = provider
            .build(&ToolArgs::new().with("greeting", "hello"))
            .unwrap();
        assert_eq!(tool.description(), "says hello");

        let err = provider
            .build(&ToolArgs::new())
            .err()
            .expect("missing greeting should fail");
        assert!(matches!(err, ToolError::MissingArgument { .. }));
    }
}

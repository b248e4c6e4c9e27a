//! Construction parameter schemas and argument bags.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};

/// Primitive kind of a construction parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// UTF-8 string.
    String,
    /// Signed integer.
    Integer,
    /// Boolean flag.
    Boolean,
    /// Any other value; cannot be synthesised.
    Opaque,
}

impl ParamKind {
    /// Returns the placeholder used when probing a provider, if this kind has one.
    ///
    /// Strings get `placeholder_<name>`, integers `0` and booleans `false`.
    #[must_use]
    pub fn placeholder(self, name: &str) -> Option<Value> {
        match self {
            Self::String => Some(Value::String(format!("placeholder_{name}"))),
            Self::Integer => Some(Value::from(0)),
            Self::Boolean => Some(Value::Bool(false)),
            Self::Opaque => None,
        }
    }
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::Opaque => "a value",
        };
        f.write_str(label)
    }
}

/// A single named construction parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    name: String,
    kind: ParamKind,
    required: bool,
}

impl ParamSpec {
    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter kind.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Returns `true` when the provider cannot be built without this parameter.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Ordered description of the parameters a provider accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl ParameterSchema {
    /// Creates a schema with no parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required parameter.
    #[must_use]
    pub fn required(self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.push(name.into(), kind, true)
    }

    /// Adds an optional parameter.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.push(name.into(), kind, false)
    }

    fn push(mut self, name: String, kind: ParamKind, required: bool) -> Self {
        // A later declaration of the same name replaces the earlier one.
        self.params.retain(|param| param.name != name);
        self.params.push(ParamSpec {
            name,
            kind,
            required,
        });
        self
    }

    /// Returns the declared parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Synthesises the argument set used for probe construction.
    ///
    /// Only required parameters are filled. Opaque parameters are left unset,
    /// so providers that need them fail to build from defaults.
    #[must_use]
    pub fn default_args(&self) -> ToolArgs {
        let mut args = ToolArgs::new();
        for param in self.params.iter().filter(|param| param.required) {
            if let Some(value) = param.kind.placeholder(&param.name) {
                args.insert(param.name.clone(), value);
            }
        }
        args
    }
}

/// Named construction arguments handed to a provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`ToolArgs::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the raw value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the value for `name`, whatever its type.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingArgument`] when the argument is absent.
    pub fn value(&self, name: &str) -> ToolResult<&Value> {
        self.0.get(name).ok_or_else(|| ToolError::MissingArgument {
            name: name.to_owned(),
        })
    }

    /// Returns the string argument `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingArgument`] when absent and
    /// [`ToolError::InvalidArgument`] when the value is not a string.
    pub fn string(&self, name: &str) -> ToolResult<&str> {
        self.value(name)?
            .as_str()
            .ok_or_else(|| invalid(name, ParamKind::String))
    }

    /// Returns the integer argument `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingArgument`] when absent and
    /// [`ToolError::InvalidArgument`] when the value is not an integer.
    pub fn integer(&self, name: &str) -> ToolResult<i64> {
        self.value(name)?
            .as_i64()
            .ok_or_else(|| invalid(name, ParamKind::Integer))
    }

    /// Returns the boolean argument `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingArgument`] when absent and
    /// [`ToolError::InvalidArgument`] when the value is not a boolean.
    pub fn boolean(&self, name: &str) -> ToolResult<bool> {
        self.value(name)?
            .as_bool()
            .ok_or_else(|| invalid(name, ParamKind::Boolean))
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no arguments are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

fn invalid(name: &str, expected: ParamKind) -> ToolError {
    ToolError::InvalidArgument {
        name: name.to_owned(),
        expected,
    }
}

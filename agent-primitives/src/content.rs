//! Conversation content model.
//!
//! A [`Content`] is one turn of a conversation: an optional role plus an
//! ordered list of [`Part`]s. Parts are either plain text or structured
//! payloads such as function invocations and inline binary data.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One turn of conversation content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    /// Creates content with the supplied parts and no role.
    #[must_use]
    pub fn new(parts: Vec<Part>) -> Self {
        Self { role: None, parts }
    }

    /// Creates a single-part user turn holding `text`.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_owned()),
            parts: vec![Part::text(text)],
        }
    }

    /// Sets the role label for this turn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRole`] when the role is empty or whitespace.
    pub fn with_role(mut self, role: impl Into<String>) -> Result<Self> {
        let role = role.into();
        if role.trim().is_empty() {
            return Err(Error::InvalidRole { role });
        }
        self.role = Some(role);
        Ok(self)
    }

    /// Returns the role label, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns the ordered parts.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns the text of the first part when it is non-empty text.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.parts.first().and_then(Part::as_text)
    }
}

/// A single piece of content within a turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text(String),
    /// A model-issued function invocation.
    FunctionCall(FunctionCall),
    /// The result of a function invocation.
    FunctionResponse(FunctionResponse),
    /// Inline binary data with a media type label.
    InlineData(Blob),
}

impl Part {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the text when this is a non-empty text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Descriptor of a function invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    args: Option<Map<String, Value>>,
}

impl FunctionCall {
    /// Creates a call to the named function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPart`] if the function name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Some(non_empty_name(name.into())?),
            args: None,
        })
    }

    /// Attaches call arguments.
    #[must_use]
    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = Some(args);
        self
    }

    /// Returns the function name, if known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the call arguments, if any.
    #[must_use]
    pub fn args(&self) -> Option<&Map<String, Value>> {
        self.args.as_ref()
    }
}

/// Descriptor of a function result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<Map<String, Value>>,
}

impl FunctionResponse {
    /// Creates a response from the named function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPart`] if the function name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Some(non_empty_name(name.into())?),
            response: None,
        })
    }

    /// Attaches the response payload.
    #[must_use]
    pub fn with_response(mut self, response: Map<String, Value>) -> Self {
        self.response = Some(response);
        self
    }

    /// Returns the function name, if known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the response payload, if any.
    #[must_use]
    pub fn response(&self) -> Option<&Map<String, Value>> {
        self.response.as_ref()
    }
}

/// Inline binary payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default)]
    data: Bytes,
}

impl Blob {
    /// Creates a blob labelled with `mime_type`.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Bytes) -> Self {
        let mime_type = mime_type.into();
        Self {
            mime_type: (!mime_type.trim().is_empty()).then_some(mime_type),
            data,
        }
    }

    /// Returns the media type label, if any.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

fn non_empty_name(name: String) -> Result<String> {
    if name.trim().is_empty() {
        return Err(Error::invalid_part("function name cannot be empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_text_requires_leading_text_part() {
        let content = Content::new(vec![
            Part::InlineData(Blob::new("image/png", Bytes::from_static(b"png"))),
            Part::text("caption"),
        ]);
        assert_eq!(content.first_text(), None);

        let content = Content::new(vec![Part::text(""), Part::text("later")]);
        assert_eq!(content.first_text(), None);

        assert_eq!(Content::user_text("hello").first_text(), Some("hello"));
    }

    #[test]
    fn empty_function_name_is_rejected() {
        let err = FunctionCall::new(" ").expect_err("blank name should fail");
        assert!(matches!(err, Error::InvalidPart { .. }));
        assert!(FunctionResponse::new("").is_err());
    }

    #[test]
    fn blank_role_is_rejected() {
        let err = Content::default().with_role("").expect_err("blank role");
        assert!(matches!(err, Error::InvalidRole { .. }));
    }

    #[test]
    fn parts_serialize_externally_tagged() {
        let part = Part::text("hi");
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hi" }));

        let blob = Blob::new("", Bytes::new());
        assert_eq!(blob.mime_type(), None);
    }
}

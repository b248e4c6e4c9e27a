//! Record types for stored conversations.

use agent_primitives::Content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MemoryError, MemoryResult};

/// One author-tagged turn of a past conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    author: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Content>,
}

impl MemoryEvent {
    /// Creates a builder for an event authored by `author`.
    #[must_use]
    pub fn builder(author: impl Into<String>) -> MemoryEventBuilder {
        MemoryEventBuilder {
            author: author.into(),
            timestamp: Utc::now(),
            content: None,
        }
    }

    /// Returns the author label.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns when the event happened.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the event content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }
}

/// Builder type used to assemble [`MemoryEvent`] instances safely.
#[derive(Debug)]
pub struct MemoryEventBuilder {
    author: String,
    timestamp: DateTime<Utc>,
    content: Option<Content>,
}

impl MemoryEventBuilder {
    /// Sets the event timestamp.
    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the event content.
    #[must_use]
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Finalises the builder and produces the event.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::InvalidRecord`] when the author is empty or whitespace.
    pub fn build(self) -> MemoryResult<MemoryEvent> {
        if self.author.trim().is_empty() {
            return Err(MemoryError::InvalidRecord("event author must not be empty"));
        }
        Ok(MemoryEvent {
            author: self.author,
            timestamp: self.timestamp,
            content: self.content,
        })
    }
}

/// A retrieved conversation snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    id: Uuid,
    events: Vec<MemoryEvent>,
}

impl MemoryEntry {
    /// Creates an entry with a random identifier.
    #[must_use]
    pub fn new(events: Vec<MemoryEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            events,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the events in conversation order.
    #[must_use]
    pub fn events(&self) -> &[MemoryEvent] {
        &self.events
    }

    /// Returns the timestamp of the first event.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(MemoryEvent::timestamp)
    }

    /// Iterates over every non-empty text part across all events.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter_map(MemoryEvent::content)
            .flat_map(|content| content.parts().iter().filter_map(|part| part.as_text()))
    }
}

/// Result of a memory search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMemoryResponse {
    memories: Vec<MemoryEntry>,
}

impl SearchMemoryResponse {
    /// Wraps the matched entries.
    #[must_use]
    pub fn new(memories: Vec<MemoryEntry>) -> Self {
        Self { memories }
    }

    /// Returns the matched entries.
    #[must_use]
    pub fn memories(&self) -> &[MemoryEntry] {
        &self.memories
    }

    /// Returns `true` when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }
}

//! In-memory volatile store backed by a bounded ring buffer.

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::MemoryResult;
use crate::record::{MemoryEntry, SearchMemoryResponse};
use crate::service::MemoryService;

/// Configuration for the volatile memory buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatileConfig {
    capacity: NonZeroUsize,
}

impl VolatileConfig {
    /// Creates a configuration with the provided capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(self) -> NonZeroUsize {
        self.capacity
    }
}

impl Default for VolatileConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(256).expect("non-zero"),
        }
    }
}

/// Volatile memory ring retaining the most recent entries.
///
/// Search is keyword based: an entry matches when any of its text parts
/// shares a lower-cased word with the query.
#[derive(Debug)]
pub struct VolatileMemory {
    config: VolatileConfig,
    entries: RwLock<VecDeque<MemoryEntry>>,
}

impl Default for VolatileMemory {
    fn default() -> Self {
        Self::new(VolatileConfig::default())
    }
}

impl VolatileMemory {
    /// Creates a new buffer using the supplied configuration.
    #[must_use]
    pub fn new(config: VolatileConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(VecDeque::with_capacity(config.capacity().get())),
        }
    }

    /// Inserts an entry, evicting the oldest entries once capacity is exceeded.
    pub async fn push(&self, entry: MemoryEntry) {
        let mut guard = self.entries.write().await;
        guard.push_back(entry);

        while guard.len() > self.config.capacity().get() {
            if let Some(evicted) = guard.pop_front() {
                debug!(entry_id = %evicted.id(), "evicted memory entry");
            }
        }
    }

    /// Returns the most recent entries up to the requested limit, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<MemoryEntry> {
        let guard = self.entries.read().await;
        let skip = guard.len().saturating_sub(limit);
        guard.iter().skip(skip).cloned().collect()
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when the buffer is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Clears all stored entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl MemoryService for VolatileMemory {
    async fn search_memory(&self, query: &str) -> MemoryResult<SearchMemoryResponse> {
        let query_words = lowercase_words(query);
        if query_words.is_empty() {
            return Ok(SearchMemoryResponse::default());
        }

        let guard = self.entries.read().await;
        let memories: Vec<MemoryEntry> = guard
            .iter()
            .filter(|entry| {
                entry
                    .texts()
                    .any(|text| !lowercase_words(text).is_disjoint(&query_words))
            })
            .cloned()
            .collect();
        debug!(matches = memories.len(), "memory search completed");
        Ok(SearchMemoryResponse::new(memories))
    }

    async fn add_entry(&self, entry: MemoryEntry) -> MemoryResult<()> {
        self.push(entry).await;
        Ok(())
    }
}

fn lowercase_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use agent_primitives::{Blob, Content, Part};
    use bytes::Bytes;

    use crate::record::MemoryEvent;

    fn entry(author: &str, text: &str) -> MemoryEntry {
        MemoryEntry::new(vec![
            MemoryEvent::builder(author)
                .content(Content::user_text(text))
                .build()
                .unwrap(),
        ])
    }

    #[tokio::test]
    async fn evicts_oldest_entries_when_full() {
        let memory = VolatileMemory::new(VolatileConfig::new(NonZeroUsize::new(2).unwrap()));
        memory.push(entry("user", "first")).await;
        memory.push(entry("user", "second")).await;
        memory.push(entry("user", "third")).await;

        assert_eq!(memory.len().await, 2);
        let recent = memory.recent(5).await;
        let texts: Vec<_> = recent.iter().flat_map(MemoryEntry::texts).collect();
        assert_eq!(texts, ["second", "third"]);

        let last = memory.recent(1).await;
        assert_eq!(last[0].texts().next(), Some("third"));
    }

    #[tokio::test]
    async fn search_matches_shared_words_case_insensitively() {
        let memory = VolatileMemory::default();
        memory
            .add_entry(entry("user", "I booked a Flight to Lisbon"))
            .await
            .unwrap();
        memory.add_entry(entry("user", "Weather is nice")).await.unwrap();
        memory
            .add_entry(MemoryEntry::new(vec![
                MemoryEvent::builder("user")
                    .content(Content::new(vec![Part::InlineData(Blob::new(
                        "image/png",
                        Bytes::from_static(b"flight"),
                    ))]))
                    .build()
                    .unwrap(),
            ]))
            .await
            .unwrap();

        let response = memory.search_memory("flight status").await.unwrap();
        assert_eq!(response.memories().len(), 1);
        assert_eq!(
            response.memories()[0].texts().next(),
            Some("I booked a Flight to Lisbon")
        );

        assert!(memory.search_memory("  ").await.unwrap().is_empty());
        assert!(memory.search_memory("unrelated").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_buffer() {
        let memory = VolatileMemory::default();
        memory.push(entry("user", "hello")).await;
        memory.clear().await;
        assert!(memory.is_empty().await);
    }
}

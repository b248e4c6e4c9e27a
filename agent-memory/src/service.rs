//! Retrieval contract for memory backends.

use async_trait::async_trait;

use crate::record::{MemoryEntry, SearchMemoryResponse};
use crate::MemoryResult;

/// Backend able to store past conversations and retrieve those relevant to a
/// query.
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// Returns the stored entries relevant to `query`.
    async fn search_memory(&self, query: &str) -> MemoryResult<SearchMemoryResponse>;

    /// Stores an entry for later retrieval.
    async fn add_entry(&self, entry: MemoryEntry) -> MemoryResult<()>;
}

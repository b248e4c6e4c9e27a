//! Conversation memory for agents.
//!
//! Memories are past conversation snippets ([`MemoryEntry`]) made of ordered,
//! author-tagged events. A [`MemoryService`] retrieves the entries relevant to
//! a query; [`VolatileMemory`] is the in-process implementation.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod record;
pub mod service;
pub mod volatile;

pub use error::{MemoryError, MemoryResult};
pub use record::{MemoryEntry, MemoryEvent, MemoryEventBuilder, SearchMemoryResponse};
pub use service::MemoryService;
pub use volatile::{VolatileConfig, VolatileMemory};

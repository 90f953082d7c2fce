//! Chunk store for persisted audio.
//!
//! Provides an ordered, persistent mapping from chunk index to samples plus
//! a small metadata table. Every operation is a single await point, so a
//! producer driving the store never holds the scheduler across two chunks.

pub mod combine;
pub mod disk;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export commonly used types
pub use combine::{combine_ordered, combine_ordered_to_file};
pub use disk::DiskChunkStore;
pub use memory::MemoryChunkStore;

/// Ordered key-value persistence for audio chunks and session metadata.
///
/// Implementations hold two logical tables: chunks keyed by their index and
/// metadata keyed by name. Writes to a single chunk are atomic; `clear`
/// empties both tables or fails without assuming either was emptied.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Opens or creates the underlying structures. Idempotent.
    async fn initialize(&self) -> Result<()>;

    /// Stores `samples` at `index`, replacing any previous chunk there.
    async fn put_chunk(&self, index: usize, samples: &[f32]) -> Result<()>;

    /// Returns the samples at `index`, or `None` if no chunk is stored there.
    async fn get_chunk(&self, index: usize) -> Result<Option<Vec<f32>>>;

    /// Number of stored chunks.
    async fn count(&self) -> Result<usize>;

    /// Sum of the sample counts of all stored chunks. Scans the whole table.
    async fn total_sample_count(&self) -> Result<u64>;

    /// Empties the chunk and metadata tables together.
    async fn clear(&self) -> Result<()>;

    /// Sets a metadata entry.
    async fn put_meta(&self, key: &str, value: u64) -> Result<()>;

    /// Reads a metadata entry.
    async fn get_meta(&self, key: &str) -> Result<Option<u64>>;
}

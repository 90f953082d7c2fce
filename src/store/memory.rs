//! In-memory chunk store.
//!
//! Keeps both tables in ordered maps behind a single lock. Used by hosts
//! without a writable disk and throughout the test suite.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;

use super::ChunkStore;

#[derive(Debug, Default)]
struct Tables {
    chunks: BTreeMap<usize, Vec<f32>>,
    meta: BTreeMap<String, u64>,
}

/// Chunk store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    tables: Mutex<Tables>,
}

impl MemoryChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored chunk indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.tables.lock().chunks.keys().copied().collect()
    }

    /// Removes a single chunk, leaving a gap.
    pub fn remove_chunk(&self, index: usize) -> Option<Vec<f32>> {
        self.tables.lock().chunks.remove(&index)
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn put_chunk(&self, index: usize, samples: &[f32]) -> Result<()> {
        self.tables.lock().chunks.insert(index, samples.to_vec());
        Ok(())
    }

    async fn get_chunk(&self, index: usize) -> Result<Option<Vec<f32>>> {
        Ok(self.tables.lock().chunks.get(&index).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.tables.lock().chunks.len())
    }

    async fn total_sample_count(&self) -> Result<u64> {
        Ok(self
            .tables
            .lock()
            .chunks
            .values()
            .map(|samples| samples.len() as u64)
            .sum())
    }

    async fn clear(&self) -> Result<()> {
        let mut tables = self.tables.lock();
        tables.chunks.clear();
        tables.meta.clear();
        Ok(())
    }

    async fn put_meta(&self, key: &str, value: u64) -> Result<()> {
        self.tables.lock().meta.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_meta(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.tables.lock().meta.get(key).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overwrite_keeps_single_entry() {
        let store = MemoryChunkStore::new();
        store.put_chunk(5, &[0.1, 0.2]).await.unwrap();
        store.put_chunk(5, &[0.9]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get_chunk(5).await.unwrap(), Some(vec![0.9]));
    }

    #[tokio::test]
    async fn missing_chunk_is_none() {
        let store = MemoryChunkStore::new();
        assert_eq!(store.get_chunk(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_empties_both_tables() {
        let store = MemoryChunkStore::new();
        store.put_chunk(0, &[0.0; 4]).await.unwrap();
        store.put_chunk(1, &[0.0; 6]).await.unwrap();
        store.put_meta("sample_rate", 44100).await.unwrap();
        assert_eq!(store.total_sample_count().await.unwrap(), 10);

        store.clear().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.total_sample_count().await.unwrap(), 0);
        assert_eq!(store.get_meta("sample_rate").await.unwrap(), None);
    }

    #[tokio::test]
    async fn indices_are_ordered() {
        let store = MemoryChunkStore::new();
        for index in [3, 0, 2, 1] {
            store.put_chunk(index, &[]).await.unwrap();
        }
        assert_eq!(store.indices(), vec![0, 1, 2, 3]);

        store.remove_chunk(2);
        assert_eq!(store.indices(), vec![0, 1, 3]);
    }
}

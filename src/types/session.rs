//! Session lifecycle and metadata types.
//!
//! A session is one generation run: its state machine, the running totals
//! kept in memory while it runs, and the metadata handed to export.

use serde::{Deserialize, Serialize};

use crate::audio::samples_to_duration;
use crate::error::Result;
use crate::store::ChunkStore;

/// Metadata table key for the session sample rate.
pub const META_SAMPLE_RATE: &str = "sample_rate";
/// Metadata table key for the number of persisted chunks.
pub const META_TOTAL_CHUNKS: &str = "total_chunks";
/// Metadata table key for the number of persisted samples.
pub const META_TOTAL_SAMPLES: &str = "total_samples";

/// State of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No run active.
    #[default]
    Idle,
    /// Chunks are being synthesized and persisted.
    Running,
    /// All chunks were persisted.
    Completed,
    /// The run was stopped at a chunk boundary and the store cleared.
    Cancelled,
    /// The run hit a fatal error and the store was cleared.
    Failed,
}

impl RunState {
    /// Returns true if the run has settled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }

    /// Returns true while chunks are being produced.
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Running)
    }

    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
            RunState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory running totals of a run.
///
/// Updated once per persisted chunk so progress and export never need to
/// scan the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionTotals {
    /// Number of chunks persisted so far.
    pub chunks: usize,
    /// Number of samples persisted so far.
    pub samples: u64,
}

impl SessionTotals {
    /// Accounts for one more persisted chunk.
    pub fn record(&mut self, sample_count: usize) {
        self.chunks += 1;
        self.samples += sample_count as u64;
    }

    /// Resets both totals to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Sample rate and totals of a finished (or reloaded) session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of persisted chunks.
    pub total_chunks: usize,
    /// Sum of the sample counts of all persisted chunks.
    pub total_samples: u64,
}

impl SessionMetadata {
    /// Builds metadata from in-memory run totals.
    pub fn from_totals(sample_rate: u32, totals: SessionTotals) -> Self {
        Self {
            sample_rate,
            total_chunks: totals.chunks,
            total_samples: totals.samples,
        }
    }

    /// Duration of the session audio in seconds.
    pub fn duration_sec(&self) -> f64 {
        samples_to_duration(self.total_samples, self.sample_rate)
    }

    /// Writes the metadata table entries for this session.
    pub async fn persist<S>(&self, store: &S) -> Result<()>
    where
        S: ChunkStore + ?Sized,
    {
        store
            .put_meta(META_SAMPLE_RATE, u64::from(self.sample_rate))
            .await?;
        store
            .put_meta(META_TOTAL_CHUNKS, self.total_chunks as u64)
            .await?;
        store.put_meta(META_TOTAL_SAMPLES, self.total_samples).await
    }

    /// Reconstructs metadata from a store, e.g. after a reload.
    ///
    /// Persisted metadata is advisory: missing totals are recomputed with
    /// the store's `count()` and `total_sample_count()` scans, and a missing
    /// sample rate falls back to `default_sample_rate`.
    pub async fn load<S>(store: &S, default_sample_rate: u32) -> Result<Self>
    where
        S: ChunkStore + ?Sized,
    {
        let sample_rate = store
            .get_meta(META_SAMPLE_RATE)
            .await?
            .and_then(|rate| u32::try_from(rate).ok())
            .filter(|rate| *rate > 0)
            .unwrap_or(default_sample_rate);

        let total_chunks = match store.get_meta(META_TOTAL_CHUNKS).await? {
            Some(chunks) => chunks as usize,
            None => store.count().await?,
        };

        let total_samples = match store.get_meta(META_TOTAL_SAMPLES).await? {
            Some(samples) => samples,
            None => store.total_sample_count().await?,
        };

        Ok(Self {
            sample_rate,
            total_chunks,
            total_samples,
        })
    }
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every chunk was synthesized and persisted.
    Completed(SessionMetadata),
    /// The run was cancelled; `chunks_discarded` chunks were cleared.
    Cancelled { chunks_discarded: usize },
}

impl RunOutcome {
    /// Returns the session metadata of a completed run.
    pub fn metadata(&self) -> Option<&SessionMetadata> {
        match self {
            RunOutcome::Completed(metadata) => Some(metadata),
            RunOutcome::Cancelled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryChunkStore;

    #[test]
    fn run_state_terminal() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Idle.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Running.is_active());
    }

    #[test]
    fn totals_accumulate() {
        let mut totals = SessionTotals::default();
        totals.record(44100);
        totals.record(22050);
        totals.record(44100);
        assert_eq!(totals.chunks, 3);
        assert_eq!(totals.samples, 110_250);

        totals.reset();
        assert_eq!(totals, SessionTotals::default());
    }

    #[test]
    fn duration_from_samples() {
        let metadata = SessionMetadata {
            sample_rate: 44100,
            total_chunks: 2,
            total_samples: 88200,
        };
        assert_eq!(metadata.duration_sec(), 2.0);

        let unknown_rate = SessionMetadata {
            sample_rate: 0,
            ..metadata
        };
        assert_eq!(unknown_rate.duration_sec(), 0.0);
    }

    #[tokio::test]
    async fn persist_then_load_uses_table() {
        let store = MemoryChunkStore::new();
        let metadata = SessionMetadata {
            sample_rate: 24000,
            total_chunks: 4,
            total_samples: 1000,
        };
        metadata.persist(&store).await.unwrap();

        let loaded = SessionMetadata::load(&store, 44100).await.unwrap();
        assert_eq!(loaded, metadata);
    }

    #[tokio::test]
    async fn load_falls_back_to_scans() {
        let store = MemoryChunkStore::new();
        store.put_chunk(0, &[0.0; 10]).await.unwrap();
        store.put_chunk(1, &[0.0; 5]).await.unwrap();

        let loaded = SessionMetadata::load(&store, 44100).await.unwrap();
        assert_eq!(loaded.sample_rate, 44100);
        assert_eq!(loaded.total_chunks, 2);
        assert_eq!(loaded.total_samples, 15);
    }
}

//! Chunked text-to-speech generation.
//!
//! A [`GenerationPipeline`] splits text into chunks, synthesizes them one at
//! a time through a [`SpeechEngine`] and persists each result to a
//! [`ChunkStore`] in strictly increasing index order. Control is handed back
//! to the runtime around every inference call, and cancellation is only
//! observed between chunks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::NarrateConfig;
use crate::engine::SpeechEngine;
use crate::error::{NarrateError, Result};
use crate::store::ChunkStore;
use crate::types::{
    AudioChunk, InferenceSettings, Progress, RunOutcome, RunState, SessionMetadata,
    SessionTotals, META_SAMPLE_RATE,
};

use super::chunker::{split_text, DEFAULT_MAX_CHUNK_CHARS};
use super::eta::{EtaEstimator, DEFAULT_ETA_WINDOW};
use super::preview::{PreviewBuffer, DEFAULT_PREVIEW_SECONDS};

/// Tunables of a pipeline, usually derived from [`NarrateConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Sample rate of the engine output in Hz.
    pub sample_rate: u32,
    /// Target maximum chunk length in characters.
    pub max_chunk_chars: usize,
    /// Length of the in-memory preview in seconds.
    pub max_preview_seconds: u32,
    /// Number of recent chunk timings behind the ETA.
    pub eta_window: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_preview_seconds: DEFAULT_PREVIEW_SECONDS,
            eta_window: DEFAULT_ETA_WINDOW,
        }
    }
}

impl From<&NarrateConfig> for PipelineOptions {
    fn from(config: &NarrateConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            max_chunk_chars: config.max_chunk_chars,
            max_preview_seconds: config.max_preview_seconds,
            eta_window: config.eta_window,
        }
    }
}

/// State shared between a pipeline and its cancel handles.
#[derive(Debug, Default)]
struct RunControl {
    state: Mutex<RunState>,
    cancel: AtomicBool,
}

impl RunControl {
    fn state(&self) -> RunState {
        *self.state.lock()
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock() = state;
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Requests cancellation of a running pipeline from anywhere.
///
/// Cloning is cheap; every clone controls the same pipeline.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    control: Arc<RunControl>,
}

impl CancelHandle {
    /// Raises the cancellation flag if a run is active.
    ///
    /// Returns false (and does nothing) when the pipeline is not running.
    /// The in-flight inference call is never interrupted; the run stops at
    /// the next chunk boundary.
    pub fn cancel(&self) -> bool {
        let state = self.control.state.lock();
        if !state.is_active() {
            return false;
        }
        self.control.cancel.store(true, Ordering::SeqCst);
        true
    }

    /// Returns true if cancellation was requested for the current run.
    pub fn is_cancelled(&self) -> bool {
        self.control.cancel_requested()
    }

    /// Current state of the pipeline.
    pub fn state(&self) -> RunState {
        self.control.state()
    }
}

/// Marks the run failed if the `start` future is dropped mid-run.
struct RunGuard {
    control: Arc<RunControl>,
    armed: bool,
}

impl RunGuard {
    fn new(control: Arc<RunControl>) -> Self {
        Self {
            control,
            armed: true,
        }
    }

    fn settle(mut self, state: RunState) {
        self.control.set_state(state);
        self.armed = false;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!("narration abandoned mid-run, partial chunks remain until the next run");
            self.control.set_state(RunState::Failed);
        }
    }
}

/// Drives one narration at a time from text to persisted chunks.
pub struct GenerationPipeline<S, E>
where
    S: ChunkStore + ?Sized,
    E: SpeechEngine,
{
    store: Arc<S>,
    engine: E,
    options: PipelineOptions,
    control: Arc<RunControl>,
    totals: SessionTotals,
    preview: PreviewBuffer,
    eta: EtaEstimator,
}

impl<S, E> GenerationPipeline<S, E>
where
    S: ChunkStore + ?Sized,
    E: SpeechEngine,
{
    /// Creates an idle pipeline writing to `store`.
    pub fn new(store: Arc<S>, engine: E, options: PipelineOptions) -> Self {
        Self {
            store,
            engine,
            preview: PreviewBuffer::new(options.sample_rate, options.max_preview_seconds),
            eta: EtaEstimator::new(options.eta_window),
            options,
            control: Arc::new(RunControl::default()),
            totals: SessionTotals::default(),
        }
    }

    /// Returns a handle that can cancel runs of this pipeline.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            control: Arc::clone(&self.control),
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.control.state()
    }

    /// Totals of the current or last completed run.
    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    /// Metadata of the last run, if it completed.
    pub fn metadata(&self) -> Option<SessionMetadata> {
        (self.state() == RunState::Completed)
            .then(|| SessionMetadata::from_totals(self.options.sample_rate, self.totals))
    }

    /// Preview of the first seconds of the current or last run.
    pub fn preview(&self) -> &PreviewBuffer {
        &self.preview
    }

    /// The store chunks are persisted to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Returns a settled pipeline to `Idle`. No-op while running.
    pub fn reset(&mut self) -> bool {
        let mut state = self.control.state.lock();
        if state.is_active() {
            return false;
        }
        *state = RunState::Idle;
        self.control.cancel.store(false, Ordering::SeqCst);
        true
    }

    /// Narrates `text` chunk by chunk.
    ///
    /// The store is cleared before the first chunk. `on_progress` runs after
    /// every persisted chunk. A cancelled run clears the store and returns
    /// [`RunOutcome::Cancelled`]; an engine or store failure clears the store,
    /// leaves the pipeline `Failed` and returns the error. Input errors
    /// (empty text, bad settings, store that cannot be opened) are returned
    /// before the run starts and leave the state untouched.
    pub async fn start<F>(
        &mut self,
        text: &str,
        style: &E::Style,
        settings: &InferenceSettings,
        mut on_progress: F,
    ) -> Result<RunOutcome>
    where
        F: FnMut(&Progress),
    {
        if self.state().is_active() {
            return Err(NarrateError::generation_in_progress());
        }
        settings.validate()?;

        let chunks = split_text(text, self.options.max_chunk_chars);
        if chunks.is_empty() {
            return Err(NarrateError::empty_text());
        }

        self.store.initialize().await?;

        self.totals.reset();
        self.preview = PreviewBuffer::new(self.options.sample_rate, self.options.max_preview_seconds);
        self.eta.reset();
        self.control.cancel.store(false, Ordering::SeqCst);
        self.control.set_state(RunState::Running);
        let guard = RunGuard::new(Arc::clone(&self.control));

        info!(
            chunks = chunks.len(),
            sample_rate = self.options.sample_rate,
            "narration started"
        );

        let result = self.run(&chunks, style, settings, &mut on_progress).await;

        match &result {
            Ok(RunOutcome::Completed(metadata)) => {
                info!(
                    chunks = metadata.total_chunks,
                    samples = metadata.total_samples,
                    duration_sec = metadata.duration_sec(),
                    "narration completed"
                );
                guard.settle(RunState::Completed);
            }
            Ok(RunOutcome::Cancelled { chunks_discarded }) => {
                info!(chunks_discarded, "narration cancelled");
                guard.settle(RunState::Cancelled);
            }
            Err(e) => {
                warn!(error = %e, "narration failed");
                guard.settle(RunState::Failed);
            }
        }

        result
    }

    async fn run<F>(
        &mut self,
        chunks: &[String],
        style: &E::Style,
        settings: &InferenceSettings,
        on_progress: &mut F,
    ) -> Result<RunOutcome>
    where
        F: FnMut(&Progress),
    {
        self.store.clear().await?;
        if let Err(e) = self
            .store
            .put_meta(META_SAMPLE_RATE, u64::from(self.options.sample_rate))
            .await
        {
            return Err(self.discard(e).await);
        }

        let total = chunks.len();
        for (index, text) in chunks.iter().enumerate() {
            if self.control.cancel_requested() {
                return self.cancelled().await;
            }

            let started = Instant::now();
            tokio::task::yield_now().await;
            let synthesized = self.engine.synthesize(text, style, settings).await;
            tokio::task::yield_now().await;

            let chunk = match synthesized {
                Ok(synthesis) => AudioChunk::new(index, synthesis.samples),
                Err(e) => {
                    let err = NarrateError::inference_failed(index, e.message);
                    return Err(self.discard(err).await);
                }
            };
            if !chunk.is_well_formed() {
                let err = NarrateError::inference_failed(index, "engine returned non-finite samples");
                return Err(self.discard(err).await);
            }

            if let Err(e) = self.store.put_chunk(index, &chunk.samples).await {
                return Err(self.discard(e).await);
            }

            self.totals.record(chunk.sample_count());
            self.preview.append(&chunk.samples);
            self.eta.record(started.elapsed());

            debug!(
                index,
                samples = chunk.sample_count(),
                chars = text.chars().count(),
                "chunk persisted"
            );
            on_progress(&Progress::generating(
                index,
                total,
                self.eta.estimate(total - index - 1),
            ));
        }

        if self.control.cancel_requested() {
            return self.cancelled().await;
        }

        let metadata = SessionMetadata::from_totals(self.options.sample_rate, self.totals);
        if let Err(e) = metadata.persist(&*self.store).await {
            warn!(error = %e, "session metadata not persisted");
        }

        Ok(RunOutcome::Completed(metadata))
    }

    async fn cancelled(&mut self) -> Result<RunOutcome> {
        let chunks_discarded = self.totals.chunks;
        self.store.clear().await?;
        self.totals.reset();
        Ok(RunOutcome::Cancelled { chunks_discarded })
    }

    /// Clears partial output after a fatal error and hands the error back.
    async fn discard(&mut self, err: NarrateError) -> NarrateError {
        if let Err(clear_err) = self.store.clear().await {
            warn!(error = %clear_err, "could not clear partial narration");
        }
        self.totals.reset();
        err
    }
}

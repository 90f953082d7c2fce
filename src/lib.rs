//! narrator: chunked text-to-speech generation with a persistent chunk store.
//!
//! Long texts are split into sentence-aligned chunks, synthesized one at a
//! time by a pluggable [`engine::SpeechEngine`], and persisted to a
//! [`store::ChunkStore`] so memory stays bounded regardless of length. A
//! finished session is exported as a single mono 16-bit PCM WAV file.
//!
//! # Modules
//!
//! - [`generation`]: Chunking, the generation pipeline, preview and ETA
//! - [`store`]: Chunk persistence (disk and memory) and ordered combine
//! - [`export`]: Full and preview export
//! - [`audio`]: PCM conversion and WAV framing
//! - [`types`]: Core data types (AudioChunk, SessionMetadata, RunState)
//! - [`config`]: Runtime configuration (NarrateConfig)
//! - [`error`]: Error types and codes (NarrateError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use narrator::{
//!     config::NarrateConfig,
//!     export::export_full,
//!     generation::{GenerationPipeline, PipelineOptions},
//!     store::DiskChunkStore,
//! };
//!
//! let config = NarrateConfig::from_env();
//! let store = Arc::new(DiskChunkStore::new(config.effective_store_path()));
//! let mut pipeline = GenerationPipeline::new(store.clone(), engine, PipelineOptions::from(&config));
//!
//! let outcome = pipeline
//!     .start(&text, &voice, &config.inference, |p| println!("{}", p.status))
//!     .await?;
//! if let Some(metadata) = outcome.metadata() {
//!     let wav = export_full(&*store, metadata, |_| {}).await?;
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod generation;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::NarrateConfig;
pub use engine::{EngineError, SpeechEngine, Synthesis};
pub use error::{ErrorCode, NarrateError, Result};
pub use generation::{CancelHandle, GenerationPipeline, PipelineOptions};
pub use store::{ChunkStore, DiskChunkStore, MemoryChunkStore};
pub use types::{AudioChunk, InferenceSettings, Progress, RunOutcome, RunState, SessionMetadata};

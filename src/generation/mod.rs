//! Narration generation.
//!
//! Turns text into persisted audio chunks: the chunker plans the work, the
//! pipeline drives the engine, and the preview and ETA track the run.

pub mod chunker;
pub mod eta;
pub mod pipeline;
pub mod preview;

// Re-export commonly used items
pub use chunker::{split_text, DEFAULT_MAX_CHUNK_CHARS};
pub use eta::{EtaEstimator, DEFAULT_ETA_WINDOW};
pub use pipeline::{CancelHandle, GenerationPipeline, PipelineOptions};
pub use preview::{PreviewBuffer, DEFAULT_PREVIEW_SECONDS};

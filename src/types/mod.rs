//! Core types for the narrator.
//!
//! This module re-exports all the core data types used throughout the crate:
//! - [`AudioChunk`]: One synthesized segment keyed by its chunk index
//! - [`SessionMetadata`]: Sample rate and running totals of a narration
//! - [`InferenceSettings`]: Parameters forwarded to the inference engine
//! - [`RunState`] / [`RunOutcome`]: Generation lifecycle
//! - [`Progress`]: Progress reports for generation and export

mod chunk;
mod progress;
mod session;
mod settings;

// Re-export all types at the module level
pub use chunk::AudioChunk;
pub use progress::{format_eta, Progress, ProgressPhase};
pub use session::{
    RunOutcome, RunState, SessionMetadata, SessionTotals, META_SAMPLE_RATE, META_TOTAL_CHUNKS,
    META_TOTAL_SAMPLES,
};
pub use settings::InferenceSettings;

//! Inference engine boundary.
//!
//! The text-to-speech model lives outside this crate. Hosts plug it in by
//! implementing [`SpeechEngine`]; the pipeline only sees text going in and
//! normalized samples coming out.

use std::fmt;

use async_trait::async_trait;

use crate::types::InferenceSettings;

/// Output of one inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Normalized samples in [-1, 1] at the session sample rate.
    pub samples: Vec<f32>,
    /// Duration of the samples in seconds, as reported by the engine.
    pub duration_sec: f32,
}

/// Failure reported by an engine, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

/// A text-to-speech model.
///
/// A single call may take seconds. Implementations doing heavy synchronous
/// work should move it off the async runtime (e.g. `spawn_blocking`) so the
/// pipeline's caller stays responsive.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Opaque voice style reference, loaded by the host.
    type Style: Send + Sync;

    /// Synthesizes one chunk of text.
    async fn synthesize(
        &self,
        text: &str,
        style: &Self::Style,
        settings: &InferenceSettings,
    ) -> std::result::Result<Synthesis, EngineError>;
}

//! InferenceSettings type for engine call parameters.

use serde::{Deserialize, Serialize};

use crate::error::{NarrateError, Result};

/// Parameters forwarded to the inference engine for every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Number of denoising steps per chunk.
    /// Higher values = better quality but slower synthesis.
    pub inference_steps: u32,

    /// Speaking rate multiplier (1.0 = natural pace).
    pub speed: f32,

    /// Silence appended after each chunk, in seconds.
    pub silence_duration: f32,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            inference_steps: 5,
            speed: 1.05,
            silence_duration: 0.3,
        }
    }
}

impl InferenceSettings {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.inference_steps) {
            return Err(NarrateError::invalid_settings(format!(
                "inference_steps must be between 1 and 100, got {}",
                self.inference_steps
            )));
        }
        if !(0.5..=2.0).contains(&self.speed) {
            return Err(NarrateError::invalid_settings(format!(
                "speed must be between 0.5 and 2.0, got {}",
                self.speed
            )));
        }
        if !(0.0..=5.0).contains(&self.silence_duration) {
            return Err(NarrateError::invalid_settings(format!(
                "silence_duration must be between 0 and 5 seconds, got {}",
                self.silence_duration
            )));
        }
        Ok(())
    }
}

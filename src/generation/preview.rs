//! Bounded in-memory preview of the recording.
//!
//! Holds the first `max_preview_seconds` of audio so a finished (or running)
//! narration can be played back without reading the chunk store.

/// Default preview length in seconds.
pub const DEFAULT_PREVIEW_SECONDS: u32 = 30;

/// Append-only prefix of the recording, capped at a fixed sample count.
#[derive(Debug, Clone, Default)]
pub struct PreviewBuffer {
    samples: Vec<f32>,
    capacity: usize,
}

impl PreviewBuffer {
    /// Creates a buffer holding at most `sample_rate * max_seconds` samples.
    pub fn new(sample_rate: u32, max_seconds: u32) -> Self {
        Self::with_capacity(sample_rate as usize * max_seconds as usize)
    }

    /// Creates a buffer holding at most `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::new(),
            capacity,
        }
    }

    /// Appends as much of `samples` as fits. Returns the number taken.
    pub fn append(&mut self, samples: &[f32]) -> usize {
        let take = self.remaining().min(samples.len());
        self.samples.extend_from_slice(&samples[..take]);
        take
    }

    /// Samples still accepted before the buffer freezes.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.samples.len())
    }

    /// Returns true once the cap is reached.
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Maximum number of samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Buffered samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_from_rate_and_seconds() {
        let preview = PreviewBuffer::new(44100, DEFAULT_PREVIEW_SECONDS);
        assert_eq!(preview.capacity(), 1_323_000);
        assert!(preview.is_empty());
    }

    #[test]
    fn stops_exactly_at_cap() {
        let mut preview = PreviewBuffer::new(10, 3);

        assert_eq!(preview.append(&[0.1; 12]), 12);
        assert_eq!(preview.append(&[0.2; 12]), 12);
        assert_eq!(preview.append(&[0.3; 12]), 6);
        assert!(preview.is_full());
        assert_eq!(preview.append(&[0.4; 12]), 0);

        assert_eq!(preview.len(), 30);
    }

    #[test]
    fn content_is_prefix_of_stream() {
        let stream: Vec<f32> = (0..50).map(|i| i as f32 / 50.0).collect();
        let mut preview = PreviewBuffer::with_capacity(32);

        for chunk in stream.chunks(7) {
            preview.append(chunk);
        }

        assert_eq!(preview.samples(), &stream[..32]);
    }
}

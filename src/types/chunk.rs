//! AudioChunk type for one synthesized text segment.

/// One synthesized segment of the recording.
///
/// Chunks are created right after a successful inference call, handed to
/// the chunk store, and never mutated afterwards. The `index` is dense and
/// 0-based within a session; it is the only ordering key used at export.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Position of the chunk within the session.
    pub index: usize,
    /// Normalized samples in [-1, 1].
    pub samples: Vec<f32>,
}

impl AudioChunk {
    /// Creates a new chunk.
    pub fn new(index: usize, samples: Vec<f32>) -> Self {
        Self { index, samples }
    }

    /// Number of samples in the chunk.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if every sample is a finite number.
    pub fn is_well_formed(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_matches_len() {
        let chunk = AudioChunk::new(3, vec![0.0; 128]);
        assert_eq!(chunk.sample_count(), 128);
        assert_eq!(chunk.index, 3);
    }

    #[test]
    fn non_finite_samples_are_malformed() {
        assert!(AudioChunk::new(0, vec![0.5, -1.0]).is_well_formed());
        assert!(!AudioChunk::new(0, vec![0.5, f32::NAN]).is_well_formed());
        assert!(!AudioChunk::new(0, vec![f32::INFINITY]).is_well_formed());
    }
}

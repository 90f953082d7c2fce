//! Float to 16-bit PCM sample conversion.

/// Bytes per encoded 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Converts a normalized float sample to a signed 16-bit PCM sample.
///
/// The input is clamped to [-1, 1]; negative values scale by 32768 and
/// non-negative values by 32767, truncating toward zero. NaN maps to 0.
pub fn float_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Appends the little-endian 16-bit encoding of `samples` to `out`.
pub fn encode_pcm16_into(samples: &[f32], out: &mut Vec<u8>) {
    out.reserve(samples.len() * BYTES_PER_SAMPLE);
    for &sample in samples {
        out.extend_from_slice(&float_to_i16(sample).to_le_bytes());
    }
}

/// Calculates the duration of audio in seconds from sample count.
pub fn samples_to_duration(sample_count: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / sample_rate as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_values() {
        assert_eq!(float_to_i16(1.0), 32767);
        assert_eq!(float_to_i16(-1.0), -32768);
        assert_eq!(float_to_i16(0.0), 0);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(float_to_i16(1.5), 32767);
        assert_eq!(float_to_i16(-7.0), -32768);
        assert_eq!(float_to_i16(f32::INFINITY), 32767);
        assert_eq!(float_to_i16(f32::NEG_INFINITY), -32768);
        assert_eq!(float_to_i16(f32::NAN), 0);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(float_to_i16(0.5), 16383);
        // -0.5 * 32768 = -16384 exactly
        assert_eq!(float_to_i16(-0.5), -16384);
        // -0.00001 * 32768 = -0.32768
        assert_eq!(float_to_i16(-0.00001), 0);
    }

    #[test]
    fn encodes_little_endian() {
        let mut out = Vec::new();
        encode_pcm16_into(&[1.0, -1.0], &mut out);
        assert_eq!(out, vec![0xff, 0x7f, 0x00, 0x80]);
    }

    #[test]
    fn samples_to_duration_calculation() {
        assert_eq!(samples_to_duration(44100, 44100), 1.0);
        assert_eq!(samples_to_duration(22050, 44100), 0.5);
        assert_eq!(samples_to_duration(100, 0), 0.0);
    }
}

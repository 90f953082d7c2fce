//! WAV container writer for audio output.
//!
//! Writes mono 16-bit PCM RIFF/WAVE containers. The 44-byte header is
//! written by hand so it can be emitted before any sample exists, which is
//! what lets the chunk store stream a recording chunk by chunk.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::audio::pcm::{encode_pcm16_into, BYTES_PER_SAMPLE};
use crate::error::{NarrateError, Result};
use crate::types::AudioChunk;

/// Size of the canonical PCM WAVE header.
pub const HEADER_LEN: usize = 44;

/// Number of audio channels (mono).
pub const CHANNELS: u16 = 1;

/// Bits per encoded sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Largest sample count whose RIFF chunk size still fits in 32 bits.
pub const MAX_SAMPLES: u64 = (u32::MAX as u64 - 36) / BYTES_PER_SAMPLE as u64;

/// Most samples worth of buffer reserved up front for a declared total.
const PREALLOC_SAMPLE_LIMIT: u64 = 1 << 22;

/// Initial buffer size for a container declared to hold `sample_count`
/// samples. Capped; the buffer grows past it as data arrives.
pub fn initial_capacity(sample_count: u64) -> usize {
    HEADER_LEN + sample_count.min(PREALLOC_SAMPLE_LIMIT) as usize * BYTES_PER_SAMPLE
}

/// Checks that `sample_count` can be framed and narrows it to 32 bits.
pub fn frame_sample_count(sample_count: u64) -> Result<u32> {
    if sample_count > MAX_SAMPLES {
        return Err(NarrateError::audio_too_long(sample_count));
    }
    Ok(sample_count as u32)
}

/// Builds the 44-byte RIFF/WAVE header for `sample_count` mono samples.
///
/// A zero sample count yields a valid header with an empty data section.
pub fn write_header(sample_count: u32, sample_rate: u32) -> [u8; HEADER_LEN] {
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));
    let data_size = sample_count.saturating_mul(BYTES_PER_SAMPLE as u32);
    let chunk_size = data_size.saturating_add(36);

    let mut header = [0u8; HEADER_LEN];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    header[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Rewrites the two size fields of an existing header in place.
///
/// `container` must start with a header produced by [`write_header`].
pub fn patch_header(container: &mut [u8], sample_count: u32) {
    let data_size = sample_count.saturating_mul(BYTES_PER_SAMPLE as u32);
    container[4..8].copy_from_slice(&data_size.saturating_add(36).to_le_bytes());
    container[40..44].copy_from_slice(&data_size.to_le_bytes());
}

/// Encodes in-memory samples as a complete WAV container.
pub fn encode_container(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let sample_count = frame_sample_count(samples.len() as u64)?;

    let mut container = Vec::with_capacity(HEADER_LEN + samples.len() * BYTES_PER_SAMPLE);
    container.extend_from_slice(&write_header(sample_count, sample_rate));
    encode_pcm16_into(samples, &mut container);

    Ok(container)
}

/// Encodes a sequence of chunks as one WAV container.
///
/// The header is sized for `total_sample_count`; chunks are appended in the
/// order the iterator yields them. If the chunks add up to a different
/// count, the header is corrected before returning.
pub fn encode_container_streaming<I>(
    total_sample_count: u64,
    sample_rate: u32,
    chunks: I,
) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = AudioChunk>,
{
    let declared = frame_sample_count(total_sample_count)?;

    let mut container = Vec::with_capacity(initial_capacity(u64::from(declared)));
    container.extend_from_slice(&write_header(declared, sample_rate));

    let mut written = 0u64;
    for chunk in chunks {
        encode_pcm16_into(&chunk.samples, &mut container);
        written += chunk.samples.len() as u64;
    }

    if written != u64::from(declared) {
        patch_header(&mut container, frame_sample_count(written)?);
    }

    Ok(container)
}

/// Incremental WAV writer over an async sink.
///
/// Writes the header up front, then converts and appends one chunk of
/// samples at a time so only a single chunk is ever held as PCM bytes.
pub struct WavStreamWriter<W> {
    sink: W,
    declared: u32,
    written: u64,
    scratch: Vec<u8>,
}

impl<W> WavStreamWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Writes a header sized for `total_sample_count` and returns the writer.
    pub async fn begin(mut sink: W, total_sample_count: u64, sample_rate: u32) -> Result<Self> {
        let declared = frame_sample_count(total_sample_count)?;
        sink.write_all(&write_header(declared, sample_rate))
            .await
            .map_err(|e| NarrateError::export_failed("WAV header", e))?;

        Ok(Self {
            sink,
            declared,
            written: 0,
            scratch: Vec::new(),
        })
    }

    /// Converts `samples` to PCM and appends them to the sink.
    pub async fn write_samples(&mut self, samples: &[f32]) -> Result<()> {
        if self.written + samples.len() as u64 > MAX_SAMPLES {
            return Err(NarrateError::audio_too_long(
                self.written + samples.len() as u64,
            ));
        }

        self.scratch.clear();
        encode_pcm16_into(samples, &mut self.scratch);
        self.sink
            .write_all(&self.scratch)
            .await
            .map_err(|e| NarrateError::export_failed("PCM data", e))?;

        self.written += samples.len() as u64;
        Ok(())
    }

    /// Number of samples the header was written for.
    pub fn declared_samples(&self) -> u32 {
        self.declared
    }

    /// Flushes the sink and returns it with the number of samples written.
    pub async fn finish(mut self) -> Result<(W, u64)> {
        self.sink
            .flush()
            .await
            .map_err(|e| NarrateError::export_failed("WAV data", e))?;
        Ok((self.sink, self.written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Cursor;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn header_fields_for_100_samples() {
        let header = write_header(100, 44100);

        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(u32_at(&header, 4), 236);
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(u32_at(&header, 16), 16);
        assert_eq!(u16_at(&header, 20), 1);
        assert_eq!(u16_at(&header, 22), 1);
        assert_eq!(u32_at(&header, 24), 44100);
        assert_eq!(u32_at(&header, 28), 88200);
        assert_eq!(u16_at(&header, 32), 2);
        assert_eq!(u16_at(&header, 34), 16);
        assert_eq!(&header[36..40], b"data");
        assert_eq!(u32_at(&header, 40), 200);
    }

    #[test]
    fn empty_header_is_valid() {
        let header = write_header(0, 24000);
        assert_eq!(u32_at(&header, 4), 36);
        assert_eq!(u32_at(&header, 40), 0);

        let reader = hound::WavReader::new(Cursor::new(header.to_vec())).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn encode_container_decodes_with_hound() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0];
        let container = encode_container(&samples, 44100).unwrap();
        assert_eq!(container.len(), HEADER_LEN + samples.len() * 2);

        let mut reader = hound::WavReader::new(Cursor::new(container)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, 16383, -16384, 32767, -32768]);
    }

    #[test]
    fn streaming_concatenates_chunks_in_order() {
        let chunks = vec![
            AudioChunk::new(0, vec![1.0, 1.0]),
            AudioChunk::new(1, vec![-1.0]),
            AudioChunk::new(2, vec![0.0, 0.0, 0.0]),
        ];
        let container = encode_container_streaming(6, 16000, chunks).unwrap();

        assert_eq!(u32_at(&container, 40), 12);
        assert_eq!(
            &container[HEADER_LEN..],
            &[0xff, 0x7f, 0xff, 0x7f, 0x00, 0x80, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn streaming_corrects_header_on_short_input() {
        let chunks = vec![AudioChunk::new(0, vec![0.25; 10])];
        let container = encode_container_streaming(50, 16000, chunks).unwrap();

        assert_eq!(container.len(), HEADER_LEN + 20);
        assert_eq!(u32_at(&container, 4), 56);
        assert_eq!(u32_at(&container, 40), 20);
    }

    #[test]
    fn oversized_recording_rejected() {
        let err = frame_sample_count(MAX_SAMPLES + 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::AudioTooLong);
        assert_eq!(frame_sample_count(MAX_SAMPLES).unwrap() as u64, MAX_SAMPLES);
    }

    #[test]
    fn preallocation_is_capped() {
        assert_eq!(initial_capacity(0), HEADER_LEN);
        assert_eq!(initial_capacity(100), HEADER_LEN + 200);
        assert_eq!(initial_capacity(MAX_SAMPLES), initial_capacity(PREALLOC_SAMPLE_LIMIT));
    }

    #[test]
    fn streaming_tolerates_inflated_total() {
        let chunks = vec![AudioChunk::new(0, vec![0.0; 3])];
        let container = encode_container_streaming(MAX_SAMPLES, 8000, chunks).unwrap();

        assert_eq!(container.len(), HEADER_LEN + 6);
        assert_eq!(u32_at(&container, 40), 6);
    }

    #[tokio::test]
    async fn stream_writer_matches_in_memory_encoder() {
        let samples = vec![0.1f32, -0.2, 0.3, -0.4];

        let mut writer = WavStreamWriter::begin(Vec::new(), 4, 22050).await.unwrap();
        writer.write_samples(&samples[..2]).await.unwrap();
        writer.write_samples(&samples[2..]).await.unwrap();
        assert_eq!(writer.declared_samples(), 4);
        let (bytes, written) = writer.finish().await.unwrap();

        assert_eq!(written, 4);
        assert_eq!(bytes, encode_container(&samples, 22050).unwrap());
    }
}

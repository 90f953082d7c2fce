//! Audio output module.
//!
//! Provides 16-bit PCM sample conversion and WAV container writing.

pub mod pcm;
pub mod wav;

// Re-export commonly used items
pub use pcm::{float_to_i16, samples_to_duration};
pub use wav::{
    encode_container, encode_container_streaming, write_header, WavStreamWriter, CHANNELS,
    HEADER_LEN,
};

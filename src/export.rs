//! Export of a finished narration.
//!
//! The full export reads every persisted chunk back in index order; the
//! preview export only encodes the in-memory preview buffer. Neither clears
//! the store: the caller decides when a download has succeeded, so a failed
//! export can be retried against intact data.

use std::path::Path;

use tracing::info;

use crate::audio::encode_container;
use crate::error::{NarrateError, Result};
use crate::store::{combine_ordered, combine_ordered_to_file, ChunkStore};
use crate::types::{Progress, SessionMetadata};

/// Builds the complete recording as an in-memory WAV container.
pub async fn export_full<S, F>(
    store: &S,
    metadata: &SessionMetadata,
    on_progress: F,
) -> Result<Vec<u8>>
where
    S: ChunkStore + ?Sized,
    F: FnMut(&Progress),
{
    if metadata.total_chunks == 0 {
        return Err(NarrateError::no_audio());
    }

    let container = combine_ordered(
        store,
        metadata.sample_rate,
        metadata.total_chunks,
        metadata.total_samples,
        on_progress,
    )
    .await?
    .ok_or_else(NarrateError::no_audio)?;

    info!(
        chunks = metadata.total_chunks,
        bytes = container.len(),
        "export complete"
    );
    Ok(container)
}

/// Writes the complete recording to a WAV file at `path`.
///
/// Returns the size of the written file in bytes.
pub async fn export_full_to_file<S, F>(
    store: &S,
    metadata: &SessionMetadata,
    path: &Path,
    on_progress: F,
) -> Result<u64>
where
    S: ChunkStore + ?Sized,
    F: FnMut(&Progress),
{
    if metadata.total_chunks == 0 {
        return Err(NarrateError::no_audio());
    }

    let size = combine_ordered_to_file(
        store,
        path,
        metadata.sample_rate,
        metadata.total_chunks,
        metadata.total_samples,
        on_progress,
    )
    .await?
    .ok_or_else(NarrateError::no_audio)?;

    info!(path = %path.display(), bytes = size, "export written");
    Ok(size)
}

/// Encodes preview samples as a WAV container without touching the store.
pub fn export_preview(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(NarrateError::no_audio());
    }
    encode_container(samples, sample_rate)
}

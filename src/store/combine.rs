//! Ordered reassembly of persisted chunks into one WAV container.
//!
//! Chunks are fetched one at a time in ascending index order and streamed
//! through a [`WavStreamWriter`], so at most one chunk of float samples is
//! resident while the container is built. Control is handed back to the
//! runtime after every chunk.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncSeekExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::audio::wav::{
    frame_sample_count, initial_capacity, patch_header, write_header, WavStreamWriter, HEADER_LEN,
};
use crate::error::{NarrateError, Result};
use crate::types::Progress;

use super::ChunkStore;

/// Combines chunks `0..total_chunks` into an in-memory WAV container.
///
/// `on_progress` runs before each chunk is fetched. Absent chunks are
/// skipped and contribute no bytes; if that leaves fewer samples than
/// `total_samples`, the header is corrected to match the data written.
/// Returns `None` when `total_chunks` is zero.
pub async fn combine_ordered<S, F>(
    store: &S,
    sample_rate: u32,
    total_chunks: usize,
    total_samples: u64,
    on_progress: F,
) -> Result<Option<Vec<u8>>>
where
    S: ChunkStore + ?Sized,
    F: FnMut(&Progress),
{
    if total_chunks == 0 {
        return Ok(None);
    }

    let writer = WavStreamWriter::begin(
        Vec::with_capacity(initial_capacity(total_samples)),
        total_samples,
        sample_rate,
    )
    .await?;
    let declared = writer.declared_samples();

    let (mut container, written) = stream_chunks(store, writer, total_chunks, on_progress).await?;

    if written != u64::from(declared) {
        patch_header(&mut container, frame_sample_count(written)?);
    }

    Ok(Some(container))
}

/// Combines chunks `0..total_chunks` straight into a WAV file at `path`.
///
/// The container is written to a `.part` sibling and renamed into place
/// once complete, so `path` only ever holds a correctly framed file.
/// Returns the file size in bytes, or `None` when `total_chunks` is zero.
pub async fn combine_ordered_to_file<S, F>(
    store: &S,
    path: &Path,
    sample_rate: u32,
    total_chunks: usize,
    total_samples: u64,
    on_progress: F,
) -> Result<Option<u64>>
where
    S: ChunkStore + ?Sized,
    F: FnMut(&Progress),
{
    if total_chunks == 0 {
        return Ok(None);
    }

    let part = part_path(path);
    let result = write_file(
        store,
        &part,
        sample_rate,
        total_chunks,
        total_samples,
        on_progress,
    )
    .await;

    let size = match result {
        Ok(size) => size,
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&part).await {
                debug!(path = %part.display(), error = %remove_err, "no partial export to remove");
            }
            return Err(e);
        }
    };

    fs::rename(&part, path)
        .await
        .map_err(|e| NarrateError::export_failed(path.display().to_string(), e))?;

    Ok(Some(size))
}

async fn write_file<S, F>(
    store: &S,
    part: &Path,
    sample_rate: u32,
    total_chunks: usize,
    total_samples: u64,
    on_progress: F,
) -> Result<u64>
where
    S: ChunkStore + ?Sized,
    F: FnMut(&Progress),
{
    let file = fs::File::create(part)
        .await
        .map_err(|e| NarrateError::export_failed(part.display().to_string(), e))?;

    let writer = WavStreamWriter::begin(BufWriter::new(file), total_samples, sample_rate).await?;
    let declared = writer.declared_samples();

    let (sink, written) = stream_chunks(store, writer, total_chunks, on_progress).await?;
    let mut file = sink.into_inner();

    if written != u64::from(declared) {
        let header = write_header(frame_sample_count(written)?, sample_rate);
        file.seek(std::io::SeekFrom::Start(0))
            .await
            .map_err(|e| NarrateError::export_failed("WAV header", e))?;
        file.write_all(&header)
            .await
            .map_err(|e| NarrateError::export_failed("WAV header", e))?;
    }

    file.sync_all()
        .await
        .map_err(|e| NarrateError::export_failed(part.display().to_string(), e))?;

    Ok(HEADER_LEN as u64 + written * 2)
}

async fn stream_chunks<S, W, F>(
    store: &S,
    mut writer: WavStreamWriter<W>,
    total_chunks: usize,
    mut on_progress: F,
) -> Result<(W, u64)>
where
    S: ChunkStore + ?Sized,
    W: AsyncWrite + Unpin,
    F: FnMut(&Progress),
{
    let mut skipped = 0usize;

    for index in 0..total_chunks {
        on_progress(&Progress::exporting(index, total_chunks));

        match store.get_chunk(index).await? {
            Some(samples) => writer.write_samples(&samples).await?,
            None => {
                skipped += 1;
                debug!(index, "chunk missing from store, skipping");
            }
        }

        tokio::task::yield_now().await;
    }

    let declared = writer.declared_samples();
    let (sink, written) = writer.finish().await?;

    if skipped > 0 {
        warn!(skipped, total_chunks, "combined audio has gaps");
    }
    if written != u64::from(declared) {
        warn!(declared, written, "sample total differs from store contents, header corrected");
    }

    Ok((sink, written))
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pcm::float_to_i16;
    use crate::error::ErrorCode;
    use crate::store::{DiskChunkStore, MemoryChunkStore};
    use crate::types::ProgressPhase;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    async fn store_with(chunks: &[&[f32]]) -> MemoryChunkStore {
        let store = MemoryChunkStore::new();
        for (index, samples) in chunks.iter().enumerate() {
            store.put_chunk(index, samples).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn zero_chunks_yield_nothing() {
        let store = MemoryChunkStore::new();
        let result = combine_ordered(&store, 44100, 0, 0, |_| {}).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn data_is_concatenation_in_index_order() {
        let store = MemoryChunkStore::new();
        // Inserted out of order on purpose
        store.put_chunk(2, &[-0.5]).await.unwrap();
        store.put_chunk(0, &[0.25, 0.5]).await.unwrap();
        store.put_chunk(1, &[1.0]).await.unwrap();

        let container = combine_ordered(&store, 8000, 3, 4, |_| {})
            .await
            .unwrap()
            .unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(container)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        let expected: Vec<i16> = [0.25, 0.5, 1.0, -0.5]
            .iter()
            .map(|&s| float_to_i16(s))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[tokio::test]
    async fn absent_chunks_are_skipped_and_header_matches() {
        let store = store_with(&[&[0.1; 10], &[0.2; 20], &[0.3; 30]]).await;
        store.remove_chunk(1);

        let container = combine_ordered(&store, 16000, 3, 60, |_| {})
            .await
            .unwrap()
            .unwrap();

        assert_eq!(container.len(), HEADER_LEN + 40 * 2);
        assert_eq!(u32_at(&container, 40), 80);
        assert_eq!(u32_at(&container, 4), 36 + 80);

        let reader = hound::WavReader::new(Cursor::new(container)).unwrap();
        assert_eq!(reader.len(), 40);
    }

    #[tokio::test]
    async fn progress_reported_before_each_chunk() {
        let store = store_with(&[&[0.0; 4], &[0.0; 4], &[0.0; 4]]).await;
        let mut seen = Vec::new();

        combine_ordered(&store, 44100, 3, 12, |p| {
            assert_eq!(p.phase, ProgressPhase::Exporting);
            seen.push((p.current, p.total));
        })
        .await
        .unwrap();

        assert_eq!(seen, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn three_chunk_scenario_length() {
        let store = store_with(&[&[0.0; 44100], &[0.0; 22050], &[0.0; 44100]]).await;

        let container = combine_ordered(&store, 44100, 3, 110_250, |_| {})
            .await
            .unwrap()
            .unwrap();

        assert_eq!(container.len(), 220_544);
        assert!(container[HEADER_LEN..].iter().all(|&b| b == 0));
    }

    #[tokio::test]
    async fn file_export_matches_in_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.wav");
        let store = store_with(&[&[0.5, -0.5], &[0.75]]).await;

        let size = combine_ordered_to_file(&store, &path, 22050, 2, 3, |_| {})
            .await
            .unwrap()
            .unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        let in_memory = combine_ordered(&store, 22050, 2, 3, |_| {})
            .await
            .unwrap()
            .unwrap();
        assert_eq!(size, on_disk.len() as u64);
        assert_eq!(on_disk, in_memory);
        assert!(!part_path(&path).exists());
    }

    #[tokio::test]
    async fn file_export_patches_header_for_gaps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gappy.wav");
        let store = store_with(&[&[0.5; 8], &[0.5; 8]]).await;
        store.remove_chunk(0);

        combine_ordered_to_file(&store, &path, 22050, 2, 16, |_| {})
            .await
            .unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 8);
    }

    #[tokio::test]
    async fn oversized_declared_total_is_corrected() {
        let store = store_with(&[&[0.5; 4]]).await;

        let container = combine_ordered(&store, 8000, 1, crate::audio::wav::MAX_SAMPLES, |_| {})
            .await
            .unwrap()
            .unwrap();

        assert_eq!(container.len(), HEADER_LEN + 8);
        assert_eq!(u32_at(&container, 40), 8);
    }

    #[tokio::test]
    async fn unwritable_destination_is_export_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("book.wav");
        let store = store_with(&[&[0.5; 8]]).await;

        let err = combine_ordered_to_file(&store, &path, 22050, 1, 8, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ExportFailed);
        assert!(!path.exists());
        assert!(!part_path(&path).exists());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn corrupt_chunk_aborts_export_and_keeps_destination() {
        let dir = tempdir().unwrap();
        let store = DiskChunkStore::new(dir.path().join("session"));
        store.initialize().await.unwrap();
        store.put_chunk(0, &[0.25; 4]).await.unwrap();
        std::fs::write(
            store.root().join("chunks").join(format!("{:010}.pcm", 1)),
            [0u8, 1, 2],
        )
        .unwrap();

        let path = dir.path().join("book.wav");
        std::fs::write(&path, b"previous export").unwrap();

        let err = combine_ordered_to_file(&store, &path, 22050, 2, 4, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StoreReadFailed);
        assert_eq!(std::fs::read(&path).unwrap(), b"previous export");
        assert!(!part_path(&path).exists());
        assert_eq!(store.count().await.unwrap(), 2);
    }
}

//! Directory-backed chunk store.
//!
//! Layout under the store root:
//! - `chunks/<index:010>.pcm`: raw little-endian `f32` samples of one chunk
//! - `metadata.json`: the metadata table as a JSON object of name to integer
//!
//! Zero-padded file names keep a directory listing in index order. Every
//! file is written to a `.tmp` sibling and renamed into place, so a reader
//! never observes a half-written chunk.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{ErrorCode, NarrateError, Result};

use super::ChunkStore;

const CHUNKS_DIR: &str = "chunks";
const METADATA_FILE: &str = "metadata.json";
const CHUNK_EXTENSION: &str = "pcm";
const BYTES_PER_FLOAT: usize = 4;

/// Chunk store persisted in a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskChunkStore {
    root: PathBuf,
}

impl DiskChunkStore {
    /// Creates a store rooted at `root`. Nothing is touched until
    /// [`ChunkStore::initialize`] runs.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chunks_dir(&self) -> PathBuf {
        self.root.join(CHUNKS_DIR)
    }

    fn chunk_path(&self, index: usize) -> PathBuf {
        self.chunks_dir()
            .join(format!("{:010}.{}", index, CHUNK_EXTENSION))
    }

    fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// Sibling directory the root is renamed to while clearing.
    fn clearing_path(&self) -> PathBuf {
        let mut name = self
            .root
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".clearing");
        self.root.with_file_name(name)
    }

    async fn chunk_files(&self) -> Result<Vec<fs::DirEntry>> {
        let mut entries = match fs::read_dir(self.chunks_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error("chunk directory", e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| read_error("chunk directory", e))?
        {
            let is_chunk = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == CHUNK_EXTENSION);
            if is_chunk {
                files.push(entry);
            }
        }
        Ok(files)
    }

    async fn read_meta_table(&self) -> Result<BTreeMap<String, u64>> {
        let bytes = match fs::read(self.metadata_path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(read_error("metadata table", e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| read_error("metadata table", e))
    }
}

#[async_trait]
impl ChunkStore for DiskChunkStore {
    async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.chunks_dir())
            .await
            .map_err(|e| NarrateError::store_unavailable(self.root.display(), e))?;
        debug!(root = %self.root.display(), "chunk store ready");
        Ok(())
    }

    async fn put_chunk(&self, index: usize, samples: &[f32]) -> Result<()> {
        write_atomic(&self.chunk_path(index), &samples_to_bytes(samples))
            .await
            .map_err(|e| NarrateError::store_write_failed(format!("chunk {}", index), e))
    }

    async fn get_chunk(&self, index: usize) -> Result<Option<Vec<f32>>> {
        let bytes = match fs::read(self.chunk_path(index)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_error(format!("chunk {}", index), e)),
        };

        bytes_to_samples(&bytes).map(Some).ok_or_else(|| {
            NarrateError::store_read_failed(format!(
                "chunk {}: {} bytes is not a whole number of samples",
                index,
                bytes.len()
            ))
        })
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunk_files().await?.len())
    }

    async fn total_sample_count(&self) -> Result<u64> {
        let mut total = 0u64;
        for entry in self.chunk_files().await? {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| read_error("chunk size", e))?;
            total += metadata.len() / BYTES_PER_FLOAT as u64;
        }
        Ok(total)
    }

    async fn clear(&self) -> Result<()> {
        let mut clearing = self.clearing_path();

        // A previous clear may have left its renamed directory behind.
        if let Err(e) = fs::remove_dir_all(&clearing).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %clearing.display(), error = %e, "could not remove stale store directory");
                clearing = unique_sibling(&clearing);
            }
        }

        match fs::rename(&self.root, &clearing).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(NarrateError::store_write_failed("store clear", e)),
        }

        fs::create_dir_all(self.chunks_dir())
            .await
            .map_err(|e| NarrateError::store_write_failed("store clear", e))?;

        if let Err(e) = fs::remove_dir_all(&clearing).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %clearing.display(), error = %e, "cleared store data left on disk");
            }
        }

        debug!(root = %self.root.display(), "chunk store cleared");
        Ok(())
    }

    async fn put_meta(&self, key: &str, value: u64) -> Result<()> {
        let mut table = self.read_meta_table().await?;
        table.insert(key.to_string(), value);

        let bytes = serde_json::to_vec_pretty(&table)
            .map_err(|e| NarrateError::store_write_failed("metadata table", e))?;
        write_atomic(&self.metadata_path(), &bytes)
            .await
            .map_err(|e| NarrateError::store_write_failed(format!("metadata '{}'", key), e))
    }

    async fn get_meta(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.read_meta_table().await?.get(key).copied())
    }
}

fn read_error(
    what: impl Into<String>,
    source: impl std::error::Error + Send + Sync + 'static,
) -> NarrateError {
    NarrateError::with_source(
        ErrorCode::StoreReadFailed,
        format!("Failed to read {}", what.into()),
        source,
    )
}

/// Returns `path` with a suffix no other clear in this process has used.
fn unique_sibling(path: &Path) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(
        ".{}-{}-{}",
        std::process::id(),
        nanos,
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    PathBuf::from(name)
}

/// Writes `bytes` next to `path` and renames the result into place.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await
}

fn samples_to_bytes(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * BYTES_PER_FLOAT);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

fn bytes_to_samples(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % BYTES_PER_FLOAT != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(BYTES_PER_FLOAT)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    )
}

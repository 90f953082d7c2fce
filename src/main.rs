//! narrator: command-line tooling for a persisted narration store.
//!
//! Reports on, exports, and clears the chunks a narration run left behind,
//! and previews how a text would be chunked.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use narrator::cli::{Cli, Command};
use narrator::config::NarrateConfig;
use narrator::export::export_full_to_file;
use narrator::generation::split_text;
use narrator::store::{ChunkStore, DiskChunkStore};
use narrator::types::{
    format_eta, SessionMetadata, META_SAMPLE_RATE, META_TOTAL_CHUNKS, META_TOTAL_SAMPLES,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("narrator=info".parse()?),
        )
        .init();

    let cli = Cli::parse_args();
    let mut config = NarrateConfig::from_env();
    cli.apply(&mut config);
    if let Some(problem) = config.validate() {
        bail!("invalid configuration: {}", problem);
    }

    let store = DiskChunkStore::new(config.effective_store_path());

    match cli.command {
        Command::Status => show_status(&store, &config).await,
        Command::Export { ref output, clear, .. } => {
            export(&store, &config, output, clear).await
        }
        Command::Clear => {
            store.initialize().await?;
            store.clear().await?;
            info!(root = %store.root().display(), "store cleared");
            Ok(())
        }
        Command::Split { ref input, .. } => show_split(input, config.max_chunk_chars),
    }
}

/// Prints what the store currently holds.
async fn show_status(store: &DiskChunkStore, config: &NarrateConfig) -> Result<()> {
    store.initialize().await?;
    let metadata = SessionMetadata::load(store, config.sample_rate).await?;

    println!("Store: {}", store.root().display());
    println!("Chunks: {}", metadata.total_chunks);
    println!("Samples: {}", metadata.total_samples);
    println!("Sample rate: {} Hz", metadata.sample_rate);
    println!(
        "Duration: {}",
        format_eta(std::time::Duration::from_secs_f64(metadata.duration_sec()))
    );

    for key in [META_SAMPLE_RATE, META_TOTAL_CHUNKS, META_TOTAL_SAMPLES] {
        match store.get_meta(key).await? {
            Some(value) => println!("  {} = {}", key, value),
            None => println!("  {} (not recorded)", key),
        }
    }

    Ok(())
}

/// Streams the persisted chunks into a WAV file.
async fn export(
    store: &DiskChunkStore,
    config: &NarrateConfig,
    output: &Path,
    clear: bool,
) -> Result<()> {
    store.initialize().await?;
    let metadata = SessionMetadata::load(store, config.sample_rate).await?;

    info!(
        chunks = metadata.total_chunks,
        samples = metadata.total_samples,
        sample_rate = metadata.sample_rate,
        "exporting narration"
    );

    let size = export_full_to_file(store, &metadata, output, |progress| {
        info!(percent = progress.percent(), "{}", progress.status);
    })
    .await
    .with_context(|| format!("exporting to {}", output.display()))?;

    println!("Saved {} bytes to {}", size, output.display());

    if clear {
        store.clear().await.context("clearing store after export")?;
        info!("store cleared");
    }

    Ok(())
}

/// Prints the chunk plan for a text file.
fn show_split(input: &Path, max_chars: usize) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let chunks = split_text(&text, max_chars);

    println!("{} chunks (max {} characters)", chunks.len(), max_chars);
    for (index, chunk) in chunks.iter().enumerate() {
        println!("{:>5}  {:>4} chars  {}", index, chunk.chars().count(), preview_line(chunk));
    }

    Ok(())
}

fn preview_line(chunk: &str) -> String {
    const WIDTH: usize = 60;
    if chunk.chars().count() <= WIDTH {
        chunk.to_string()
    } else {
        let head: String = chunk.chars().take(WIDTH - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_line_truncates_long_chunks() {
        assert_eq!(preview_line("short"), "short");

        let long = "x".repeat(100);
        let line = preview_line(&long);
        assert_eq!(line.chars().count(), 60);
        assert!(line.ends_with("..."));
    }
}

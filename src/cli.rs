//! CLI argument parser for inspecting and exporting a narration store.
//!
//! The inference engine is plugged in by host applications, so the binary
//! works on what is already persisted: status, export, clear, and a dry run
//! of the chunk planner.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::NarrateConfig;

/// narrator: chunked text-to-speech store tooling
#[derive(Parser, Debug)]
#[command(name = "narrator")]
#[command(about = "Inspect, export and clear persisted narration chunks")]
#[command(version)]
pub struct Cli {
    /// Chunk store directory (defaults to NARRATOR_STORE_PATH or the platform cache)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show chunk count, sample total and duration of the persisted session
    Status,

    /// Combine the persisted chunks into a WAV file
    Export {
        /// Output WAV file path
        #[arg(short, long)]
        output: PathBuf,

        /// Sample rate to use when the store does not record one
        #[arg(long, value_parser = clap::value_parser!(u32).range(8000..=192000))]
        sample_rate: Option<u32>,

        /// Clear the store after a successful export
        #[arg(long)]
        clear: bool,
    },

    /// Delete every persisted chunk and the session metadata
    Clear,

    /// Show how a text file would be split into chunks
    Split {
        /// Text file to split
        #[arg(short, long)]
        input: PathBuf,

        /// Target maximum chunk length in characters
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        max_chars: Option<u64>,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Applies command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut NarrateConfig) {
        if let Some(ref store) = self.store {
            config.store_path = Some(store.clone());
        }
        match self.command {
            Command::Export {
                sample_rate: Some(rate),
                ..
            } => config.sample_rate = rate,
            Command::Split {
                max_chars: Some(chars),
                ..
            } => config.max_chunk_chars = chars as usize,
            _ => {}
        }
    }
}

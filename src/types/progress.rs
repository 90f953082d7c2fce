//! Progress reports emitted during generation and export.

use std::time::Duration;

/// Which operation a progress report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// A chunk was synthesized and persisted.
    Generating,
    /// A chunk is about to be read and encoded for export.
    Exporting,
}

/// One progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Operation being reported.
    pub phase: ProgressPhase,
    /// 0-based chunk index the report refers to.
    pub current: usize,
    /// Total number of chunks in the operation.
    pub total: usize,
    /// Plain-language status line for display.
    pub status: String,
    /// Estimated time remaining (generation only, once known).
    pub eta: Option<Duration>,
}

impl Progress {
    /// Report emitted after chunk `index` of `total` has been persisted.
    pub fn generating(index: usize, total: usize, eta: Option<Duration>) -> Self {
        let mut status = format!("Generating chunk {}/{}", index + 1, total);
        if let Some(eta) = eta {
            status.push_str(&format!(", about {} remaining", format_eta(eta)));
        }
        Self {
            phase: ProgressPhase::Generating,
            current: index,
            total,
            status,
            eta,
        }
    }

    /// Report emitted before chunk `index` of `total` is read for export.
    pub fn exporting(index: usize, total: usize) -> Self {
        Self {
            phase: ProgressPhase::Exporting,
            current: index,
            total,
            status: format!("Combining chunk {}/{}", index + 1, total),
            eta: None,
        }
    }

    /// Completion as a percentage (0-100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (((self.current + 1) as f64 / self.total as f64) * 100.0).min(100.0) as u8
    }
}

/// Formats a duration as `m:ss` or `h:mm:ss`.
pub fn format_eta(eta: Duration) -> String {
    let secs = eta.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

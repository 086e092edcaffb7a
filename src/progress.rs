//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di una run.
//!
//! ## Responsabilità:
//! - Trait `ProgressObserver` notificato ad ogni file inviato all'ottimizzazione
//! - Progress bar con `indicatif` (larghezza fissa 100 caratteri)
//! - Tracking statistiche della run (totale, ottimizzati, falliti, tempo)
//! - Riga di riepilogo finale
//!
//! ## Visual feedback:
//! ```text
//! File: 42 [35%] [===================================                                                 ]
//! Total:120 Optimized:118 Failed:2 Time:0:01:37
//! ```
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new(files.len() as u64, true);
//! let mut stats = RunStats::new(files.len());
//!
//! // Per ogni file:
//! progress.file_dispatched(index + 1, files.len(), &path);
//! stats.add_optimized(&optimized);
//!
//! // Alla fine:
//! progress.finish();
//! println!("{}", stats.format_summary());
//! ```

use crate::image_processor::OptimizedImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Receives batch progress, one call per file as it is dispatched
pub trait ProgressObserver {
    /// `position` is 1-based
    fn file_dispatched(&self, position: usize, total: usize, path: &Path);

    fn finish(&self);
}

/// Manages the progress bar for a batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; a hidden one draws nothing
    pub fn new(total_files: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total_files)
        } else {
            ProgressBar::hidden()
        };
        bar.set_length(total_files);

        bar.set_style(
            ProgressStyle::with_template("File: {pos} [{percent}%] [{bar:100}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("= "),
        );

        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressObserver for ProgressManager {
    fn file_dispatched(&self, position: usize, _total: usize, _path: &Path) {
        self.bar.set_position(position as u64);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// Statistics for a single bulk or fast run
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Files whose processed record could not be written
    pub record_failures: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn add_optimized(&mut self, optimized: &OptimizedImage) {
        self.succeeded += 1;
        self.bytes_before += optimized.original_size;
        self.bytes_after += optimized.optimized_size;
    }

    pub fn add_failure(&mut self) {
        self.failed += 1;
    }

    pub fn add_record_failure(&mut self) {
        self.record_failures += 1;
    }

    /// Bytes saved across successfully optimized files (growth counts as zero)
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }

    pub fn reduction_percent(&self) -> f64 {
        if self.bytes_before > 0 {
            (self.bytes_saved() as f64 / self.bytes_before as f64) * 100.0
        } else {
            0.0
        }
    }

    /// `Total:<N> Optimized:<ok> Failed:<ko> Time:<H:MM:SS>`
    pub fn format_summary(&self) -> String {
        format!(
            "Total:{} Optimized:{} Failed:{} Time:{}",
            self.total,
            self.succeeded,
            self.failed,
            format_elapsed(self.elapsed)
        )
    }
}

/// Formats whole seconds as `H:MM:SS`; hours are not wrapped into days
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::path::PathBuf;

    fn optimized(original_size: u64, optimized_size: u64) -> OptimizedImage {
        OptimizedImage {
            path: PathBuf::from("a.jpg"),
            format: ImageFormat::Jpeg,
            original_size,
            optimized_size,
        }
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_elapsed(Duration::from_millis(5_900)), "0:00:05");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 7 * 60 + 9)), "3:07:09");
        assert_eq!(format_elapsed(Duration::from_secs(26 * 3600)), "26:00:00");
    }

    #[test]
    fn test_summary_line() {
        let mut stats = RunStats::new(3);
        stats.add_optimized(&optimized(1000, 600));
        stats.add_optimized(&optimized(500, 700));
        stats.add_failure();
        stats.elapsed = Duration::from_secs(65);

        assert_eq!(stats.format_summary(), "Total:3 Optimized:2 Failed:1 Time:0:01:05");
        assert_eq!(stats.bytes_saved(), 200);
    }

    #[test]
    fn test_reduction_percent_empty_run() {
        let stats = RunStats::new(0);
        assert_eq!(stats.reduction_percent(), 0.0);
    }

    #[test]
    fn test_hidden_progress_tracks_position() {
        let progress = ProgressManager::new(4, false);
        progress.file_dispatched(1, 4, Path::new("a.jpg"));
        progress.file_dispatched(2, 4, Path::new("b.jpg"));
        assert_eq!(progress.position(), 2);
        progress.finish();
    }
}

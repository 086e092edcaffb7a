//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore di una singola run (bulk o fast) che delega responsabilità
//! ai moduli specializzati:
//! 1. Scan della directory con `FileManager`
//! 2. Batch sequenziale con `BatchRunner`
//! 3. Statistiche finali con `RunStats`
//!
//! `run_all` concatena le run richieste (bulk poi fast) e si ferma alla prima
//! run senza candidati.

use crate::{
    config::Config,
    error::OptimizeError,
    file_manager::{FileManager, ScanMode},
    optimizer::{batch_runner::BatchRunner, task_optimizer::TaskOptimizer},
    progress::{ProgressManager, RunStats},
    state::ProcessedStore,
};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Orchestratore principale. Borrows the store so that consecutive runs share it.
pub struct MediaOptimizer<'a> {
    config: Config,
    store: &'a dyn ProcessedStore,
}

impl<'a> MediaOptimizer<'a> {
    /// Crea nuova istanza dell'ottimizzatore
    pub fn new(config: Config, store: &'a dyn ProcessedStore) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Esegue una run. A result with `total == 0` means no candidates were found.
    pub fn run(&self, root: &Path, mode: ScanMode) -> Result<RunStats> {
        let start_time = Instant::now();

        if !root.is_dir() {
            return Err(OptimizeError::NotADirectory(root.to_path_buf()).into());
        }

        info!("Starting {} optimization in: {}", mode, root.display());
        self.log_configuration();

        let files = FileManager::find_files(root, mode, self.store, self.config.store_error_policy);

        if files.is_empty() {
            info!("No candidate files in {}", root.display());
            let mut stats = RunStats::new(0);
            stats.elapsed = start_time.elapsed();
            return Ok(stats);
        }

        info!("Found {} files to process", files.len());

        let progress = ProgressManager::new(files.len() as u64, self.config.show_progress);
        let runner = BatchRunner::new(TaskOptimizer::from_config(&self.config));
        let mut stats = runner.run(&files, self.store, &progress);
        stats.elapsed = start_time.elapsed();

        self.log_final_stats(&stats);
        Ok(stats)
    }

    /// Runs each `(root, mode)` pair in order, handing every result to `on_run`
    /// before starting the next one. Stops after the first run that found no
    /// candidates; returns how many runs were performed.
    pub fn run_all<F>(&self, runs: &[(&Path, ScanMode)], mut on_run: F) -> Result<usize>
    where
        F: FnMut(ScanMode, &RunStats),
    {
        let mut performed = 0;
        for &(root, mode) in runs {
            let stats = self.run(root, mode)?;
            performed += 1;
            on_run(mode, &stats);
            if stats.total == 0 {
                break;
            }
        }
        Ok(performed)
    }

    /// Logga configurazione
    fn log_configuration(&self) {
        info!(
            "Quality: {}, best PNG compression: {}",
            self.config.quality,
            if self.config.optimize { "on" } else { "off" }
        );
        info!("Record policy: {:?}", self.config.record_policy);
    }

    /// Logga statistiche finali
    fn log_final_stats(&self, stats: &RunStats) {
        info!("=== Optimization Complete ===");
        info!("Files optimized this run: {}", stats.succeeded);
        info!("Files failed this run: {}", stats.failed);
        info!(
            "Bytes saved this run: {} ({:.2}%)",
            FileManager::format_size(stats.bytes_saved()),
            stats.reduction_percent()
        );
        if stats.record_failures > 0 {
            warn!(
                "{} files could not be recorded and will be processed again by the next fast run",
                stats.record_failures
            );
        }
        match self.store.count() {
            Ok(count) => info!("Total files ever recorded: {}", count),
            Err(e) => warn!("Could not read processed files count: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RecordPolicy, StoreErrorPolicy};
    use crate::file_manager::tests::FailingStore;
    use crate::state::SqliteStore;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn quiet_config(record_policy: RecordPolicy) -> Config {
        Config {
            record_policy,
            show_progress: false,
            ..Config::default()
        }
    }

    fn write_image(path: &Path, format: ImageFormat) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        RgbImage::from_fn(24, 24, |x, y| Rgb([x as u8 * 10, y as u8 * 10, 128]))
            .save_with_format(path, format)
            .unwrap();
    }

    fn tree(root: &Path) -> Vec<PathBuf> {
        let files = vec![
            root.join("a.jpg"),
            root.join("sub/b.png"),
            root.join("sub/deeper/c.jpeg"),
        ];
        write_image(&files[0], ImageFormat::Jpeg);
        write_image(&files[1], ImageFormat::Png);
        write_image(&files[2], ImageFormat::Jpeg);
        files
    }

    #[test]
    fn test_bulk_counts_add_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        tree(root);
        std::fs::write(root.join("sub/notes.txt"), b"not an image").unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();
        let stats = optimizer.run(root, ScanMode::Bulk).unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded + stats.failed, stats.total);
    }

    #[test]
    fn test_second_fast_run_finds_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        tree(root);

        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();

        let first = optimizer.run(root, ScanMode::Fast).unwrap();
        assert_eq!(first.total, 3);

        let second = optimizer.run(root, ScanMode::Fast).unwrap();
        assert_eq!(second.total, 0);
    }

    #[test]
    fn test_fast_run_sees_bulk_records() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        tree(root);

        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();

        optimizer.run(root, ScanMode::Bulk).unwrap();
        write_image(&root.join("new.jpg"), ImageFormat::Jpeg);

        let fast = optimizer.run(root, ScanMode::Fast).unwrap();
        assert_eq!(fast.total, 1);
        assert_eq!(fast.succeeded, 1);
    }

    #[test]
    fn test_failed_files_retried_only_after_success_policy() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        tree(root);
        std::fs::write(root.join("corrupt.jpg"), b"\xFF\xD8\xFF garbage").unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();
        optimizer.run(root, ScanMode::Fast).unwrap();
        let retry = optimizer.run(root, ScanMode::Fast).unwrap();
        assert_eq!((retry.total, retry.failed), (1, 1));

        let legacy_store = SqliteStore::open_in_memory().unwrap();
        let legacy = MediaOptimizer::new(quiet_config(RecordPolicy::BeforeOptimize), &legacy_store).unwrap();
        let first = legacy.run(root, ScanMode::Fast).unwrap();
        assert_eq!((first.total, first.failed), (4, 1));
        let retry = legacy.run(root, ScanMode::Fast).unwrap();
        assert_eq!(retry.total, 0);
    }

    #[test]
    fn test_failing_store_skips_everything_in_fast_mode() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        tree(root);

        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &FailingStore).unwrap();
        assert_eq!(optimizer.run(root, ScanMode::Fast).unwrap().total, 0);

        let config = Config {
            store_error_policy: StoreErrorPolicy::Process,
            ..quiet_config(RecordPolicy::AfterSuccess)
        };
        let optimizer = MediaOptimizer::new(config, &FailingStore).unwrap();
        let stats = optimizer.run(root, ScanMode::Fast).unwrap();
        assert_eq!((stats.total, stats.succeeded, stats.record_failures), (3, 3, 3));
    }

    #[test]
    fn test_empty_bulk_run_stops_before_fast() {
        let temp_dir = TempDir::new().unwrap();
        let empty = temp_dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();
        let fast_root = temp_dir.path().join("uploads");
        tree(&fast_root);

        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();

        let runs = [(empty.as_path(), ScanMode::Bulk), (fast_root.as_path(), ScanMode::Fast)];
        let mut seen = Vec::new();
        let performed = optimizer
            .run_all(&runs, |mode, stats| seen.push((mode, stats.total)))
            .unwrap();

        assert_eq!(performed, 1);
        assert_eq!(seen, vec![(ScanMode::Bulk, 0)]);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_run_all_continues_after_non_empty_run() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        tree(root);

        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();

        let mut seen = Vec::new();
        let performed = optimizer
            .run_all(&[(root, ScanMode::Bulk), (root, ScanMode::Fast)], |mode, stats| {
                seen.push((mode, stats.total))
            })
            .unwrap();

        // the fast pass runs, finds everything recorded by bulk
        assert_eq!(performed, 2);
        assert_eq!(seen, vec![(ScanMode::Bulk, 3), (ScanMode::Fast, 0)]);
    }

    #[test]
    fn test_rejects_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let optimizer = MediaOptimizer::new(quiet_config(RecordPolicy::AfterSuccess), &store).unwrap();

        assert!(optimizer.run(&temp_dir.path().join("missing"), ScanMode::Bulk).is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let store = SqliteStore::open_in_memory().unwrap();
        let config = Config {
            quality: 101,
            ..Config::default()
        };
        assert!(MediaOptimizer::new(config, &store).is_err());
    }
}

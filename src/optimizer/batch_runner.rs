//! # Batch Runner Module
//!
//! Processa sequenzialmente la lista di candidati: un file alla volta,
//! un esito per file, nessun errore interrompe il batch.

use crate::{
    optimizer::task_optimizer::{FileOutcome, TaskOptimizer},
    progress::{ProgressObserver, RunStats},
    state::ProcessedStore,
};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Sequential runner over a materialized candidate list
pub struct BatchRunner {
    task_optimizer: TaskOptimizer,
}

impl BatchRunner {
    pub fn new(task_optimizer: TaskOptimizer) -> Self {
        Self { task_optimizer }
    }

    /// Processes every file in order.
    ///
    /// `succeeded + failed` always equals `files.len()`; record failures are
    /// counted apart and never change the success accounting.
    pub fn run(
        &self,
        files: &[PathBuf],
        store: &dyn ProcessedStore,
        observer: &dyn ProgressObserver,
    ) -> RunStats {
        let total = files.len();
        let mut stats = RunStats::new(total);

        for (index, path) in files.iter().enumerate() {
            observer.file_dispatched(index + 1, total, path);

            let report = self.task_optimizer.process(path, store);

            if let Some(e) = &report.record_error {
                stats.add_record_failure();
                warn!("Could not record {} as processed: {}", path.display(), e);
            }

            match report.outcome {
                FileOutcome::Optimized(optimized) => stats.add_optimized(&optimized),
                FileOutcome::Failed(e) => {
                    stats.add_failure();
                    debug!("Failed to optimize {}: {}", path.display(), e);
                }
            }
        }

        observer.finish();
        stats
    }
}

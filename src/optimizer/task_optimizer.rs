//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di un singolo file: registrazione nello store
//! e ri-codifica, nell'ordine deciso dalla `RecordPolicy`.

use crate::{
    config::{Config, RecordPolicy},
    error::OptimizeError,
    image_processor::{ImageProcessor, OptimizedImage},
    state::{InsertOutcome, ProcessedStore},
};
use std::path::Path;
use tracing::debug;

/// Outcome of the optimize step for one file
#[derive(Debug)]
pub enum FileOutcome {
    Optimized(OptimizedImage),
    Failed(OptimizeError),
}

/// Everything that happened to one file
#[derive(Debug)]
pub struct TaskReport {
    pub outcome: FileOutcome,
    /// Set when the processed record could not be written
    pub record_error: Option<OptimizeError>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Optimized(_))
    }
}

/// Worker per elaborazione singoli file
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    processor: ImageProcessor,
    record_policy: RecordPolicy,
}

impl TaskOptimizer {
    pub fn new(processor: ImageProcessor, record_policy: RecordPolicy) -> Self {
        Self {
            processor,
            record_policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ImageProcessor::from_config(config), config.record_policy)
    }

    /// Processa un singolo file. Never fails: errors end up in the report.
    pub fn process(&self, path: &Path, store: &dyn ProcessedStore) -> TaskReport {
        match self.record_policy {
            RecordPolicy::BeforeOptimize => {
                let record_error = Self::record(store, path).err();
                let outcome = self.optimize(path);
                TaskReport { outcome, record_error }
            }
            RecordPolicy::AfterSuccess => {
                let outcome = self.optimize(path);
                let record_error = match outcome {
                    FileOutcome::Optimized(_) => Self::record(store, path).err(),
                    FileOutcome::Failed(_) => None,
                };
                TaskReport { outcome, record_error }
            }
        }
    }

    fn optimize(&self, path: &Path) -> FileOutcome {
        match self.processor.optimize(path) {
            Ok(optimized) => FileOutcome::Optimized(optimized),
            Err(e) => FileOutcome::Failed(e),
        }
    }

    fn record(store: &dyn ProcessedStore, path: &Path) -> Result<(), OptimizeError> {
        if store.insert(path)? == InsertOutcome::AlreadyPresent {
            debug!("Already recorded: {}", path.display());
        }
        Ok(())
    }
}

//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `media_optimizer`: Orchestratore di una run (scan + batch + statistiche)
//! - `batch_runner`: Loop sequenziale sui file candidati
//! - `task_optimizer`: Worker per singoli file (registrazione + ri-codifica)

pub mod batch_runner;
pub mod media_optimizer;
pub mod task_optimizer;

pub use batch_runner::BatchRunner;
pub use media_optimizer::MediaOptimizer;
pub use task_optimizer::{FileOutcome, TaskOptimizer, TaskReport};

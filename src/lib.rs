//! # Lemmy Image Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione, policy e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `state`: Store SQLite dei file già processati
//! - `file_manager`: Discovery dei file candidati (bulk / fast)
//! - `image_processor`: Ri-codifica in place delle immagini
//! - `optimizer`: Orchestratore della run e batch sequenziale
//! - `progress`: Progress bar e statistiche
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use lemmy_image_optimizer::{Config, MediaOptimizer, ScanMode, SqliteStore};
//!
//! let store = SqliteStore::open("optimized.db")?;
//! let optimizer = MediaOptimizer::new(Config::default(), &store)?;
//! let stats = optimizer.run(&path, ScanMode::Fast)?;
//! println!("{}", stats.format_summary());
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod optimizer;
pub mod progress;
pub mod state;

pub use config::{Config, RecordPolicy, StoreErrorPolicy, DEFAULT_DB_NAME};
pub use error::OptimizeError;
pub use file_manager::{FileManager, ScanMode};
pub use image_processor::{ImageProcessor, OptimizedImage};
pub use optimizer::MediaOptimizer;
pub use progress::RunStats;
pub use state::{ProcessedStore, SqliteStore};

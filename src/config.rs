//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ottimizzazione
//! - Definisce le policy di registrazione e di gestione errori dello store
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità di compressione (0-100, default: 70; 0 vale come 1)
//! - `optimize`: Compressione PNG massima (default: true), nessun effetto su JPEG e WebP
//! - `record_policy`: Quando registrare un file come processato (default: dopo il successo)
//! - `store_error_policy`: Cosa fare se il controllo nello store fallisce (default: skip)
//! - `show_progress`: Mostra la progress bar (default: true)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 85,
//!     record_policy: RecordPolicy::BeforeOptimize,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the SQLite file holding processed paths, created in the working directory
pub const DEFAULT_DB_NAME: &str = "optimized.db";

/// When a candidate gets written to the processed files store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordPolicy {
    /// Record only once the file has been rewritten successfully
    #[default]
    AfterSuccess,
    /// Record before attempting the optimization (failed files are never retried in fast mode)
    BeforeOptimize,
}

/// How the fast scan treats a file whose existence check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorPolicy {
    /// Assume the file was already processed
    #[default]
    Skip,
    /// Assume the file is new and optimize it
    Process,
}

/// Configuration for image optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compression quality (0-100). JPEG and WebP encoders treat 0 as 1.
    pub quality: u8,
    /// Maximum instead of default PNG compression. Only affects PNG output.
    pub optimize: bool,
    pub record_policy: RecordPolicy,
    pub store_error_policy: StoreErrorPolicy,
    /// Draw the progress bar while processing
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: 70,
            optimize: true,
            record_policy: RecordPolicy::default(),
            store_error_policy: StoreErrorPolicy::default(),
            show_progress: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.quality > 100 {
            return Err(OptimizeError::Validation(
                "Quality must be between 0 and 100".to_string(),
            ));
        }

        Ok(())
    }

    /// Default location of the config file (`~/.image-optimizer/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".image-optimizer").join("config.json"))
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content).map_err(OptimizeError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

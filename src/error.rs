//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Integra con `thiserror` per automatic error conversion
//! - Permette al chiamante di decidere la policy (skip, retry, abort) per ogni errore
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, disco pieno)
//! - `Image`: Errori del codec (formato non supportato, file corrotto)
//! - `UnsupportedFormat`: Formato non riconosciuto o non ri-codificabile
//! - `Store`: Errori del database SQLite dei file processati
//! - `NotADirectory`: Argomento directory non valido
//! - `Validation`: Parametri di configurazione non validi
//! - `Config`: File di configurazione illeggibile
//!
//! ## Esempio:
//! ```rust,ignore
//! if !path.is_dir() {
//!     return Err(OptimizeError::NotADirectory(path.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for image optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Processed files store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("'{}' is not a valid directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config file error: {0}")]
    Config(#[from] serde_json::Error),
}

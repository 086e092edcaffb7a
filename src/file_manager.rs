//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file candidati all'ottimizzazione.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva (depth-first) dei file in una directory
//! - Filtraggio dei file già processati in modalità fast
//! - Applicazione della `StoreErrorPolicy` quando lo store non risponde
//! - Utilità per dimensioni file human-readable
//!
//! ## Modalità:
//! - **Bulk**: Include ogni file trovato, senza consultare lo store
//! - **Fast**: Include solo i file che lo store non conosce
//!
//! ## Note:
//! - Nessun filtro per estensione: il formato è deciso dal contenuto al momento
//!   dell'ottimizzazione, i file non-immagine diventano fallimenti
//! - L'ordine dipende dal filesystem, non è stabile tra run
//! - La lista è materializzata per intero prima di iniziare l'ottimizzazione
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_files(root, ScanMode::Fast, &store, StoreErrorPolicy::Skip);
//! ```

use crate::config::StoreErrorPolicy;
use crate::state::ProcessedStore;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Which files a scan selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Every file in the tree
    Bulk,
    /// Only files without a processed record
    Fast,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Bulk => write!(f, "bulk"),
            ScanMode::Fast => write!(f, "fast"),
        }
    }
}

impl ScanMode {
    /// Printed when a run finds no candidates
    pub fn empty_message(&self) -> &'static str {
        match self {
            ScanMode::Bulk => "No files found",
            ScanMode::Fast => "No new files found",
        }
    }
}

/// Manages file discovery
pub struct FileManager;

impl FileManager {
    /// Find the candidate files under `root` for the given mode
    pub fn find_files(
        root: &Path,
        mode: ScanMode,
        store: &dyn ProcessedStore,
        on_store_error: StoreErrorPolicy,
    ) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut already_processed = 0usize;

        for entry in WalkDir::new(root).into_iter().filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("Skipping unreadable entry: {}", err);
                None
            }
        }) {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if mode == ScanMode::Bulk || !Self::is_processed(store, &path, on_store_error) {
                files.push(path);
            } else {
                already_processed += 1;
            }
        }

        debug!(
            "Scan of {} ({} mode): {} candidates, {} already processed",
            root.display(),
            mode,
            files.len(),
            already_processed
        );

        files
    }

    /// Existence check with the store error policy applied
    fn is_processed(store: &dyn ProcessedStore, path: &Path, on_store_error: StoreErrorPolicy) -> bool {
        match store.exists(path) {
            Ok(exists) => exists,
            Err(e) => {
                let assume_processed = on_store_error == StoreErrorPolicy::Skip;
                warn!(
                    "Could not check {} in the processed files store ({}), {}",
                    path.display(),
                    e,
                    if assume_processed { "skipping it" } else { "processing it" }
                );
                assume_processed
            }
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

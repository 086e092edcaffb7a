//! # Lemmy Image Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione delle directory passate dall'utente
//! - Caricamento configurazione e apertura dello store `optimized.db`
//! - Esecuzione della run bulk e poi di quella fast, con riepilogo per ciascuna;
//!   una run senza candidati termina il programma
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-optimizer -b /srv/pictrs/files
//! image-optimizer -f /srv/pictrs/files --quality 80 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

use lemmy_image_optimizer::{
    Config, MediaOptimizer, OptimizeError, RecordPolicy, ScanMode, SqliteStore, DEFAULT_DB_NAME,
};

#[derive(Parser)]
#[command(name = "image-optimizer")]
#[command(about = "Optimize images in place, remembering which files were already processed")]
struct Args {
    /// Optimize all images in directory
    #[arg(short = 'b', value_name = "DIR")]
    bulk: Option<PathBuf>,

    /// Optimize only new files
    #[arg(short = 'f', value_name = "DIR")]
    fast: Option<PathBuf>,

    /// Compression quality (0-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Use default instead of maximum PNG compression
    #[arg(long)]
    no_optimize: bool,

    /// Record files before optimizing them (failed files are not retried)
    #[arg(long)]
    record_before_optimize: bool,

    /// JSON config file (default: ~/.image-optimizer/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout is for the progress line and summaries)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    for dir in [&args.bulk, &args.fast].into_iter().flatten() {
        if !dir.is_dir() {
            error!("{}", OptimizeError::NotADirectory(dir.clone()));
            std::process::exit(1);
        }
    }

    let config = match load_config(&args).await {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let store = match SqliteStore::open(DEFAULT_DB_NAME) {
        Ok(store) => store,
        Err(e) => {
            error!("Could not open {}: {}", DEFAULT_DB_NAME, e);
            std::process::exit(1);
        }
    };

    let optimizer = MediaOptimizer::new(config, &store)?;

    let mut runs: Vec<(&Path, ScanMode)> = Vec::new();
    if let Some(ref dir) = args.bulk {
        runs.push((dir.as_path(), ScanMode::Bulk));
    }
    if let Some(ref dir) = args.fast {
        runs.push((dir.as_path(), ScanMode::Fast));
    }

    // An empty run prints its message and ends the program
    optimizer.run_all(&runs, |mode, stats| {
        if stats.total == 0 {
            println!("{}", mode.empty_message());
        } else {
            println!("{}", stats.format_summary());
        }
    })?;

    Ok(())
}

/// Config file first, command line flags on top
async fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::from_file(&path).await?,
        None => Config::default(),
    };

    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if args.no_optimize {
        config.optimize = false;
    }
    if args.record_before_optimize {
        config.record_policy = RecordPolicy::BeforeOptimize;
    }
    if args.no_progress {
        config.show_progress = false;
    }

    config.validate()?;
    Ok(config)
}

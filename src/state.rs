//! # State Management Module
//!
//! Questo modulo gestisce il tracking dei file processati per evitare rielaborazioni.
//!
//! ## Responsabilità:
//! - Definisce il trait `ProcessedStore`, passato esplicitamente a scanner e runner
//! - Persiste i path processati in un database SQLite (`optimized.db`)
//! - Crea lo schema se assente, senza versioning o migrazioni
//! - Restituisce gli errori al chiamante, che decide la policy da applicare
//!
//! ## Schema:
//! ```sql
//! CREATE TABLE IF NOT EXISTS images (path VARCHAR(255) PRIMARY KEY);
//! ```
//!
//! ## Strategia di persistence:
//! - Una riga per file, chiave = path come prodotto dallo scanner
//! - Path UTF-8 salvati come TEXT; su Unix i path non UTF-8 come BLOB dei byte
//!   grezzi, così due nomi diversi non collidono mai sulla stessa chiave
//! - Ogni insert è committato singolarmente (autocommit di SQLite)
//! - Un insert duplicato non è un errore: ritorna `InsertOutcome::AlreadyPresent`
//!
//! ## Esempio:
//! ```rust,ignore
//! let store = SqliteStore::open("optimized.db")?;
//! if !store.exists(path)? {
//!     store.insert(path)?;
//! }
//! ```

use crate::error::OptimizeError;
use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Result of recording a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Persistent set of already processed file paths
pub trait ProcessedStore {
    /// Whether `path` has a recorded entry
    fn exists(&self, path: &Path) -> Result<bool, OptimizeError>;

    /// Record `path` as processed
    fn insert(&self, path: &Path) -> Result<InsertOutcome, OptimizeError>;

    /// Number of recorded paths
    fn count(&self) -> Result<u64, OptimizeError>;
}

/// Key under which a path is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKey<'a> {
    /// Valid UTF-8 path, stored as TEXT
    Text(&'a str),
    /// Raw bytes of a non UTF-8 path, stored as a BLOB
    Bytes(Vec<u8>),
}

impl<'a> StoreKey<'a> {
    pub fn from_path(path: &'a Path) -> Self {
        match path.to_str() {
            Some(text) => StoreKey::Text(text),
            None => StoreKey::Bytes(raw_path_bytes(path)),
        }
    }
}

impl ToSql for StoreKey<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            StoreKey::Text(text) => ToSqlOutput::from(*text),
            StoreKey::Bytes(bytes) => ToSqlOutput::from(bytes.as_slice()),
        })
    }
}

#[cfg(unix)]
fn raw_path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(windows)]
fn raw_path_bytes(path: &Path) -> Vec<u8> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str()
        .encode_wide()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

#[cfg(not(any(unix, windows)))]
fn raw_path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

/// SQLite backed processed files store.
///
/// Holds a single connection for the whole process; both the bulk and the fast
/// run share it, so the second run sees every insert made by the first.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store file and make sure the schema exists
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, OptimizeError> {
        let conn = Connection::open(db_path.as_ref())?;
        debug!("Opened processed files store at {}", db_path.as_ref().display());
        Self::with_connection(conn)
    }

    /// Store that lives only for the lifetime of the connection
    pub fn open_in_memory() -> Result<Self, OptimizeError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, OptimizeError> {
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the `images` table if it is missing
    pub fn ensure_schema(&self) -> Result<(), OptimizeError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS images (path VARCHAR(255) PRIMARY KEY)",
            [],
        )?;
        Ok(())
    }
}

impl ProcessedStore for SqliteStore {
    fn exists(&self, path: &Path) -> Result<bool, OptimizeError> {
        let found = self
            .conn
            .query_row(
                "SELECT path FROM images WHERE path = ?1",
                [StoreKey::from_path(path)],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, path: &Path) -> Result<InsertOutcome, OptimizeError> {
        match self
            .conn
            .execute("INSERT INTO images (path) VALUES (?1)", [StoreKey::from_path(path)])
        {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Ok(InsertOutcome::AlreadyPresent)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn count(&self) -> Result<u64, OptimizeError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

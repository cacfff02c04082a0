use std::path::Path;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use tracing::info;

use crate::error::Result;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS mechanics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL DEFAULT '',
        latitude REAL NOT NULL DEFAULT 0.0,
        longitude REAL NOT NULL DEFAULT 0.0,
        skill TEXT NOT NULL,
        is_available INTEGER NOT NULL DEFAULT 1,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX IF NOT EXISTS idx_mechanics_available
        ON mechanics(is_available, skill);

    CREATE TABLE IF NOT EXISTS service_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer TEXT NOT NULL,
        mechanic_id INTEGER REFERENCES mechanics(id) ON DELETE SET NULL,
        issue_description TEXT NOT NULL DEFAULT '',
        detected_category TEXT NOT NULL,
        confidence_score REAL NOT NULL DEFAULT 0.0,
        location_latitude REAL NOT NULL,
        location_longitude REAL NOT NULL,
        is_emergency INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'Open',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX IF NOT EXISTS idx_requests_status
        ON service_requests(status, created_at);

    CREATE INDEX IF NOT EXISTS idx_requests_mechanic
        ON service_requests(mechanic_id, status);

    CREATE TABLE IF NOT EXISTS request_rejections (
        request_id INTEGER NOT NULL REFERENCES service_requests(id) ON DELETE CASCADE,
        mechanic_id INTEGER NOT NULL REFERENCES mechanics(id) ON DELETE CASCADE,
        rejected_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (request_id, mechanic_id)
    );
";

/// SQLite repository for mechanics and service requests.
///
/// All operations are synchronous (rusqlite is blocking). The connection is
/// not `Sync`; share a `Store` across threads behind a mutex, or open one
/// per thread against the same file.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    /// Opens or creates the database at `path`, creating parent directories
    /// as needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created and
    /// `StoreError::Sqlite` if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        info!("Opened dispatch database at {:?}", path);
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Sqlite` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

/// Reads a text column and parses it with `FromStr`, reporting failures as
/// a column conversion error.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

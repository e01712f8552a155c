use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

/// Stamped into `PRAGMA user_version` when a store file is created.
/// Opening a file stamped by a newer build is refused rather than risking
/// a misread of its payload rows.
pub const SCHEMA_VERSION: u32 = 1;

const PRAGMAS: &str = "\
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
";

const REPORTS_DDL: &str = "\
CREATE TABLE reports (
    id TEXT PRIMARY KEY,
    run_id TEXT NOT NULL,
    framework TEXT NOT NULL,
    target TEXT NOT NULL,
    finding_count INTEGER NOT NULL,
    suppressed_count INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    payload TEXT NOT NULL
);
CREATE INDEX idx_reports_scope ON reports(framework, target);
CREATE INDEX idx_reports_created ON reports(created_at);
";

/// Shared handle on the report database. rusqlite connections are not
/// Sync, so every access funnels through one mutex-guarded connection.
#[derive(Clone, Debug)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a store file, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self::prepare(Connection::open(path)?)?;
        info!(path = %path.display(), "report store opened");
        Ok(db)
    }

    /// In-memory store, for tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::prepare(Connection::open_in_memory()?)
    }

    /// Applies pragmas, creates the reports table on first open, and
    /// refuses a store stamped by a newer build.
    fn prepare(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(PRAGMAS)?;
        let found: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        match found {
            0 => {
                conn.execute_batch(REPORTS_DDL)?;
                conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            }
            v if v > SCHEMA_VERSION => {
                return Err(StoreError::SchemaVersion {
                    found: v,
                    supported: SCHEMA_VERSION,
                });
            }
            // Existing store at a supported version; migrations slot in
            // here when version 2 exists.
            _ => {}
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the guarded connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }
}

// Key-value backends: SQLite, single JSON file, in-memory

use crate::error::{Result, TodoError};
use fs2::FileExt;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// String-keyed durable storage.
///
/// `get` returns the stored value, or `None` for an absent key. `set`
/// overwrites unconditionally. Values are opaque to the backend.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed key-value store with a single `kv` table.
pub struct SqliteKv {
    db: Connection,
}

impl SqliteKv {
    /// Open or create the database at the given path.
    ///
    /// Parent directories are created if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path.as_ref())?;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        debug!(path = ?path.as_ref(), "Opened SQLite kv store");
        Ok(Self { db })
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

/// Key-value store persisted as one JSON object document on disk.
pub struct FileKv {
    path: PathBuf,
}

impl FileKv {
    /// Use the document at the given path. Parent directories are created
    /// if they don't exist; the file itself is created on first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Read the whole document.
    ///
    /// A missing, empty, or unparseable file counts as an empty document;
    /// the unparseable case is logged since the next write discards it.
    fn read_doc(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(path = ?self.path, error = ?e, "Failed to parse kv file, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_doc()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut doc = self.read_doc()?;
        doc.insert(key.to_string(), value.to_string());

        let json =
            serde_json::to_string_pretty(&doc).map_err(|e| TodoError::Storage(e.to_string()))?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.path)?;

        // Acquire exclusive lock before truncating
        file.lock_exclusive()?;
        file.set_len(0)?;

        use std::io::Write;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        // Lock is automatically released when file is dropped
        Ok(())
    }
}

/// In-memory key-value store for tests and examples.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

//! Round history persistence.
//!
//! The whole history is one JSON record under a well-known key and is
//! rewritten in full on every save. Loading never fails: a missing record
//! is an empty history, and a record that cannot be read or parsed is
//! logged and treated as absent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::game_engine::models::RoundHistory;

/// Durable key-value backend for [`RoundHistory`].
pub trait HistoryStore {
    /// Stored history, or empty on any failure.
    fn load(&self) -> RoundHistory;

    fn save(&mut self, history: &RoundHistory) -> Result<(), StoreError>;
}

fn decode(key: &str, raw: &str) -> RoundHistory {
    match serde_json::from_str::<RoundHistory>(raw) {
        Ok(history) => {
            debug!(key, rounds = history.len(), "loaded round history");
            history
        }
        Err(e) => {
            warn!(key, error = %e, "failed to parse round history, starting empty");
            RoundHistory::new()
        }
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        JsonFileStore { dir: dir.into(), key: key.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> RoundHistory {
        let path = self.path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => decode(&self.key, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RoundHistory::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read round history");
                RoundHistory::new()
            }
        }
    }

    fn save(&mut self, history: &RoundHistory) -> Result<(), StoreError> {
        let content = serde_json::to_string(history)?;
        self.write(&self.path(), &content)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Key-value records held in memory. `fail_writes` makes every save fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    key: String,
    records: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new(key: impl Into<String>) -> Self {
        MemoryStore { key: key.into(), ..Self::default() }
    }

    /// Put a raw record in place, as if an earlier session had written it.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.records.insert(self.key.clone(), raw.into());
        self
    }

    pub fn raw(&self) -> Option<&str> {
        self.records.get(&self.key).map(String::as_str)
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> RoundHistory {
        match self.raw() {
            Some(raw) => decode(&self.key, raw),
            None => RoundHistory::new(),
        }
    }

    fn save(&mut self, history: &RoundHistory) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Rejected(self.key.clone()));
        }
        let content = serde_json::to_string(history)?;
        self.records.insert(self.key.clone(), content);
        Ok(())
    }
}

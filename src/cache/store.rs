use crate::cache::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::errors::ExportError;
use crate::record::CompoundData;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Well-known key under which the last researched compound is persisted.
pub const CURRENT_RECORD_KEY: &str = "lastResearchCompoundData";

/// Persisted cache of JSON-serialized compound records.
///
/// Implementations must treat `clear` on a missing key as success.
pub trait CacheStore: Send + Sync {
    /// # Errors
    /// Returns `CacheError` when an entry exists but cannot be decoded, or an
    /// I/O error.
    fn read(&self, key: &str) -> Result<Option<CompoundData>, ExportError>;
    /// # Errors
    /// Returns an error if the record cannot be serialized or stored.
    fn write(&self, key: &str, record: &CompoundData) -> Result<(), ExportError>;
    /// # Errors
    /// Returns an error if an existing entry cannot be removed.
    fn clear(&self, key: &str) -> Result<(), ExportError>;

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot::default()
    }
}

fn decode(
    key: &str,
    text: &str,
    metrics: &CacheMetrics,
) -> Result<Option<CompoundData>, ExportError> {
    match serde_json::from_str::<CompoundData>(text) {
        Ok(rec) => {
            CacheMetrics::bump(&metrics.hits);
            Ok(Some(rec))
        }
        Err(e) => {
            CacheMetrics::bump(&metrics.corrupt);
            Err(ExportError::CacheError(format!(
                "entry '{key}' is not a compound record: {e}"
            )))
        }
    }
}

/// In-process store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, String>>,
    metrics: CacheMetrics,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key` without validation.
    pub fn insert_raw(&self, key: &str, json: &str) {
        self.entries.write().insert(key.to_string(), json.to_string());
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &str) -> Result<Option<CompoundData>, ExportError> {
        let guard = self.entries.read();
        match guard.get(key) {
            Some(text) => decode(key, text, &self.metrics),
            None => {
                CacheMetrics::bump(&self.metrics.misses);
                Ok(None)
            }
        }
    }

    fn write(&self, key: &str, record: &CompoundData) -> Result<(), ExportError> {
        let text = serde_json::to_string(record)?;
        self.entries.write().insert(key.to_string(), text);
        CacheMetrics::bump(&self.metrics.writes);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), ExportError> {
        self.entries.write().remove(key);
        CacheMetrics::bump(&self.metrics.clears);
        Ok(())
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// One `<key>.json` file per entry under a directory.
pub struct FileCacheStore {
    dir: PathBuf,
    metrics: CacheMetrics,
}

impl FileCacheStore {
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Self {
            dir,
            metrics: CacheMetrics::default(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, ExportError> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
        if key.is_empty() || !key.chars().all(allowed) {
            return Err(ExportError::CacheError(format!("invalid cache key: {key}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self, key: &str) -> Result<Option<CompoundData>, ExportError> {
        let path = self.entry_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => decode(key, &text, &self.metrics),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                CacheMetrics::bump(&self.metrics.misses);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, record: &CompoundData) -> Result<(), ExportError> {
        let path = self.entry_path(key)?;
        let text = serde_json::to_vec(record)?;
        // Same-directory temp file so the rename is atomic
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&text)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|pe| ExportError::Io(pe.error))?;
        CacheMetrics::bump(&self.metrics.writes);
        log::debug!("cache: wrote {} ({} bytes)", path.display(), text.len());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), ExportError> {
        let path = self.entry_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        CacheMetrics::bump(&self.metrics.clears);
        Ok(())
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compound;

    #[test]
    fn memory_store_round_trip_and_clear() {
        let store = MemoryCacheStore::new();
        assert!(store.read(CURRENT_RECORD_KEY).unwrap().is_none());
        store.write(CURRENT_RECORD_KEY, &compound("CCO")).unwrap();
        let got = store.read(CURRENT_RECORD_KEY).unwrap().unwrap();
        assert_eq!(got.canonical_smiles.as_deref(), Some("CCO"));
        store.clear(CURRENT_RECORD_KEY).unwrap();
        assert!(store.read(CURRENT_RECORD_KEY).unwrap().is_none());
        let m = store.metrics_snapshot();
        assert_eq!((m.hits, m.misses, m.writes, m.clears), (1, 2, 1, 1));
    }

    #[test]
    fn corrupt_entry_is_reported() {
        let store = MemoryCacheStore::new();
        store.insert_raw(CURRENT_RECORD_KEY, "[1,2");
        assert!(matches!(
            store.read(CURRENT_RECORD_KEY),
            Err(ExportError::CacheError(_))
        ));
        assert_eq!(store.metrics_snapshot().corrupt, 1);
    }

    #[test]
    fn file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::open(dir.path()).unwrap();
        assert!(store.read("../x").is_err());
        assert!(store.clear("a/b").is_err());
    }
}

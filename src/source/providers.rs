use crate::errors::ExportError;
use crate::record::{CatalogEntry, GenerationRecord};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies the full reference catalog synchronously.
pub trait CatalogSupplier: Send + Sync {
    fn entries(&self) -> Vec<CatalogEntry>;
}

/// Supplies a principal's generation history from some external store.
#[async_trait]
pub trait HistorySupplier: Send + Sync {
    async fn history_for(
        &self,
        principal_id: &str,
    ) -> Result<Vec<GenerationRecord>, ExportError>;
}

/// The molecule bank compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinCatalog;

impl CatalogSupplier for BuiltinCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("Water", "O", 18.015, "Solvent"),
            CatalogEntry::new("Ethanol", "CCO", 46.07, "Solvent, Disinfectant"),
            CatalogEntry::new("Acetic Acid", "CC(=O)O", 60.052, "Food Additive"),
            CatalogEntry::new("Benzene", "C1=CC=CC=C1", 78.11, "Industrial Precursor"),
            CatalogEntry::new("Aspirin", "CC(=O)OC1=CC=CC=C1C(=O)O", 180.16, "Analgesic"),
            CatalogEntry::new(
                "Caffeine",
                "CN1C=NC2=C1C(=O)N(C(=O)N2C)C",
                194.19,
                "Stimulant",
            ),
            CatalogEntry::new("Paracetamol", "CC(=O)NC1=CC=C(C=C1)O", 151.16, "Analgesic"),
            CatalogEntry::new("Glucose", "C(C1C(C(C(C(O1)O)O)O)O)O", 180.16, "Metabolite"),
        ]
    }
}

/// Catalog read once from a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    entries: Vec<CatalogEntry>,
}

impl JsonCatalog {
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON array of entries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&text)?;
        log::info!(
            "catalog: loaded {} entries from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(Self { entries })
    }
}

impl CatalogSupplier for JsonCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.clone()
    }
}

/// History kept in memory, keyed by principal id.
#[derive(Default)]
pub struct MemoryHistory {
    by_principal: RwLock<HashMap<String, Vec<GenerationRecord>>>,
    failing: RwLock<bool>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, principal_id: &str, records: Vec<GenerationRecord>) {
        self.by_principal
            .write()
            .insert(principal_id.to_string(), records);
    }

    /// Make every subsequent fetch fail, as an expired upstream session would.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.write() = failing;
    }
}

#[async_trait]
impl HistorySupplier for MemoryHistory {
    async fn history_for(
        &self,
        principal_id: &str,
    ) -> Result<Vec<GenerationRecord>, ExportError> {
        if *self.failing.read() {
            return Err(ExportError::Provider(format!(
                "history fetch rejected for {principal_id}"
            )));
        }
        Ok(self
            .by_principal
            .read()
            .get(principal_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// History stored as `<dir>/<principal>.json`, one JSON array per principal.
#[derive(Debug, Clone)]
pub struct JsonHistoryDir {
    dir: PathBuf,
}

impl JsonHistoryDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, principal_id: &str) -> Result<PathBuf, ExportError> {
        if principal_id.is_empty()
            || principal_id.contains(['/', '\\'])
            || principal_id.starts_with('.')
        {
            return Err(ExportError::Provider(format!(
                "invalid principal id: {principal_id}"
            )));
        }
        Ok(self.dir.join(format!("{principal_id}.json")))
    }
}

#[async_trait]
impl HistorySupplier for JsonHistoryDir {
    async fn history_for(
        &self,
        principal_id: &str,
    ) -> Result<Vec<GenerationRecord>, ExportError> {
        let path = self.path_for(principal_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("history: no file for principal at {}", path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(ExportError::Io(e)),
        }
    }
}

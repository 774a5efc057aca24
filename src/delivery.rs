//! File delivery: where a finished payload ends up.
use crate::errors::ExportError;
use crate::export::Payload;
use parking_lot::RwLock;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Accepts a finished payload and saves it somewhere.
pub trait FileDelivery: Send + Sync {
    /// # Errors
    /// Returns an error if the payload cannot be saved.
    fn deliver(&self, payload: &Payload) -> Result<DeliveryReport, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Where the payload was saved, for file-backed deliveries.
    pub location: Option<PathBuf>,
    pub bytes: u64,
}

/// Writes payloads into a directory under their suggested filename.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileDelivery for DirectoryDelivery {
    fn deliver(&self, payload: &Payload) -> Result<DeliveryReport, ExportError> {
        let name = Path::new(&payload.filename).file_name().ok_or_else(|| {
            ExportError::Delivery(format!("invalid filename: {}", payload.filename))
        })?;
        let dest = self.dir.join(name);
        write_atomic(&dest, &payload.bytes)?;
        let bytes = payload.bytes.len();
        log::info!(
            "delivery: wrote {} ({} bytes, {})",
            dest.display(),
            bytes,
            payload.mime_type
        );
        log::info!(
            target: crate::logger::AUDIT_TARGET,
            "delivered file={} mime={} bytes={}",
            payload.filename,
            payload.mime_type,
            bytes
        );
        Ok(DeliveryReport {
            location: Some(dest),
            bytes: bytes as u64,
        })
    }
}

/// Write `bytes` to `dest` atomically via a temp file + persist.
///
/// # Errors
/// Returns an error if the destination cannot be created or the write/persist
/// fails.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }
    // Temp file in the same directory so the final rename is atomic
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    // Persist with Windows-friendly retries
    let mut last_err: Option<io::Error> = None;
    for attempt in 0..5 {
        if dest.exists()
            && let Err(e) = std::fs::remove_file(dest)
        {
            last_err = Some(e);
            std::thread::sleep(std::time::Duration::from_millis(10 + attempt * 5));
            continue;
        }
        match tmp.persist(dest) {
            Ok(_f) => return Ok(()),
            Err(pe) => {
                last_err = Some(pe.error);
                tmp = pe.file;
                std::thread::sleep(std::time::Duration::from_millis(10 + attempt * 5));
            }
        }
    }
    Err(ExportError::Io(last_err.unwrap_or_else(|| {
        io::Error::other("failed to persist export file")
    })))
}

/// Keeps delivered payloads in memory.
#[derive(Debug, Default)]
pub struct CollectingDelivery {
    delivered: RwLock<Vec<Payload>>,
}

impl CollectingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn delivered(&self) -> Vec<Payload> {
        self.delivered.read().clone()
    }
}

impl FileDelivery for CollectingDelivery {
    fn deliver(&self, payload: &Payload) -> Result<DeliveryReport, ExportError> {
        self.delivered.write().push(payload.clone());
        Ok(DeliveryReport {
            location: None,
            bytes: payload.bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, text: &str) -> Payload {
        Payload {
            bytes: text.as_bytes().to_vec(),
            filename: name.into(),
            mime_type: "text/csv",
        }
    }

    #[test]
    fn directory_delivery_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let d = DirectoryDelivery::new(dir.path().join("out"));
        d.deliver(&payload("moleculeBank_data.csv", "a\n")).unwrap();
        let rep = d.deliver(&payload("moleculeBank_data.csv", "b\n")).unwrap();
        let path = rep.location.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "b\n");
        assert_eq!(rep.bytes, 2);
    }

    #[test]
    fn directory_delivery_strips_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let d = DirectoryDelivery::new(dir.path());
        let rep = d.deliver(&payload("../escape.csv", "x")).unwrap();
        assert_eq!(rep.location.unwrap(), dir.path().join("escape.csv"));
    }

    #[test]
    fn collecting_delivery_keeps_payloads() {
        let d = CollectingDelivery::new();
        d.deliver(&payload("a.csv", "1")).unwrap();
        assert_eq!(d.delivered().len(), 1);
    }
}

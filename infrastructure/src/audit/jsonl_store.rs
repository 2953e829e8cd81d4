//! Append-only JSONL audit store.
//!
//! One [`AuditEntry`] per line. Each append is flushed and synced before it
//! returns, so an entry is on disk before the transition it records.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use valgen_application::ports::audit_store::{AuditStore, AuditStoreError};
use valgen_domain::AuditEntry;

pub struct JsonlAuditStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditStore {
    /// Open (or create) the ledger file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;
        debug!("Audit store opened at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry from `path` without opening it for writing.
    pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<AuditEntry>, AuditStoreError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(path, e)),
        };

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| AuditStoreError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl AuditStore for JsonlAuditStore {
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStoreError> {
        Self::read_entries(&self.path)
    }

    fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
        let line = serde_json::to_string(entry).map_err(|e| AuditStoreError::Io(e.to_string()))?;
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{}", line).map_err(|e| io_error(&self.path, e))?;
        file.flush().map_err(|e| io_error(&self.path, e))?;
        file.sync_data().map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, error: std::io::Error) -> AuditStoreError {
    AuditStoreError::Io(format!("{}: {}", path.display(), error))
}

//! JSONL transcript writer.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying `type`,
//! `timestamp` and the event payload. The audit ledger only stores payload
//! digests; the transcript is where the full prompts and responses live.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;
use valgen_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};

pub struct JsonlTranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Create a transcript at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            writer: Mutex::new(BufWriter::new(File::create(path)?)),
            path: path.to_path_buf(),
        })
    }

    /// Create `<dir>/<timestamp>-<document stem>.transcript.jsonl`.
    ///
    /// Returns `None` (after a warning) when the file cannot be created; a
    /// missing transcript never stops a run.
    pub fn for_run(dir: impl AsRef<Path>, document_name: &str) -> Option<Self> {
        let stem = Path::new(document_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let file_name = format!(
            "{}-{}.transcript.jsonl",
            Utc::now().format("%Y%m%dT%H%M%S"),
            sanitize(stem)
        );
        let path = dir.as_ref().join(file_name);
        match Self::create(&path) {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("Could not create transcript {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn record(event: ConversationEvent) -> Value {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), Value::String(event.event_type.to_string()));
    map.insert("timestamp".to_string(), Value::String(timestamp));
    Value::Object(map)
}

impl ConversationLogger for JsonlTranscriptLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&record(event)) else {
            return;
        };
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Transcript write failed: {}", e);
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}

use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::BatchEntry;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to read log file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create log directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize log file {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write log file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Append-only history of batches, stored as one pretty-printed JSON array.
///
/// Every append rewrites the whole file. There is no locking: two processes
/// appending at the same time can lose a batch.
#[derive(Debug, Clone)]
pub struct BatchLog {
    path: PathBuf,
}

impl BatchLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prior entries, kept as raw JSON so they are written back untouched.
    ///
    /// A missing file is an empty history. So is a file that is not a JSON
    /// array; its content is dropped on the next append.
    pub fn load(&self) -> Result<Vec<Value>, LogError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(LogError::Read { path: self.path.clone(), source }),
        };

        match serde_json::from_slice::<Vec<Value>>(&contents) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "log file is not a JSON array, discarding previous history"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Append `entry` and rewrite the file. Returns the number of entries now stored.
    pub fn append(&self, entry: &BatchEntry) -> Result<usize, LogError> {
        let mut entries = self.load()?;

        let value = serde_json::to_value(entry)
            .map_err(|source| LogError::Serialize { path: self.path.clone(), source })?;
        entries.push(value);

        self.write(&entries)?;
        debug!(path = %self.path.display(), entries = entries.len(), "batch appended");

        Ok(entries.len())
    }

    fn write(&self, entries: &[Value]) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| LogError::CreateDir { path: parent.to_path_buf(), source })?;
        }

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        entries
            .serialize(&mut ser)
            .map_err(|source| LogError::Serialize { path: self.path.clone(), source })?;

        fs::write(&self.path, buf).map_err(|source| LogError::Write { path: self.path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportRecord, WeatherSummary};
    use serde_json::json;
    use tempfile::TempDir;

    fn batch(timestamp: &str) -> BatchEntry {
        let delhi = json!({
            "name": "Delhi",
            "main": {"temp": 30, "humidity": 40},
            "weather": [{"description": "clear sky"}],
            "sys": {"country": "IN"}
        });
        BatchEntry {
            timestamp: timestamp.to_string(),
            results: vec![
                ReportRecord::success(&WeatherSummary::from_payload(&delhi)),
                ReportRecord::failure("Nowhereistan"),
            ],
        }
    }

    fn read_array(path: &Path) -> Vec<Value> {
        let text = fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let log = BatchLog::new(dir.path().join("Weather File.txt"));

        assert!(log.load().unwrap().is_empty());
        assert_eq!(log.append(&batch("19-Oct-2026 09:00:00 AM")).unwrap(), 1);
    }

    #[test]
    fn round_trip_last_entry_matches_records() {
        let dir = TempDir::new().unwrap();
        let log = BatchLog::new(dir.path().join("log.json"));
        let entry = batch("19-Oct-2026 09:00:00 AM");

        log.append(&entry).unwrap();

        let stored = read_array(log.path());
        let last = stored.last().unwrap();
        assert_eq!(last["timestamp"], "19-Oct-2026 09:00:00 AM");
        let results: Vec<ReportRecord> = serde_json::from_value(last["results"].clone()).unwrap();
        assert_eq!(results, entry.results);
    }

    #[test]
    fn repeated_appends_preserve_prior_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        let prior = r#"[{"timestamp": "01-Jan-2026 10:00:00 PM", "results": [], "note": "kept"}]"#;
        fs::write(&path, prior).unwrap();
        let log = BatchLog::new(&path);

        log.append(&batch("19-Oct-2026 09:00:00 AM")).unwrap();
        let count = log.append(&batch("19-Oct-2026 09:05:00 AM")).unwrap();

        assert_eq!(count, 3);
        let stored = read_array(&path);
        assert_eq!(stored[0], json!({"timestamp": "01-Jan-2026 10:00:00 PM", "results": [], "note": "kept"}));
        assert_eq!(stored[1]["timestamp"], "19-Oct-2026 09:00:00 AM");
        assert_eq!(stored[2]["timestamp"], "19-Oct-2026 09:05:00 AM");
    }

    #[test]
    fn corrupt_file_is_replaced_by_new_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, b"\x00\xffnot json at all").unwrap();
        let log = BatchLog::new(&path);

        assert_eq!(log.append(&batch("19-Oct-2026 09:00:00 AM")).unwrap(), 1);

        let stored = read_array(&path);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["timestamp"], "19-Oct-2026 09:00:00 AM");
    }

    #[test]
    fn json_object_is_treated_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, r#"{"timestamp": "x"}"#).unwrap();

        assert!(BatchLog::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn output_is_indented_and_keeps_non_ascii() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("log.json");
        let log = BatchLog::new(&path);
        let entry = BatchEntry {
            timestamp: "19-Oct-2026 09:00:00 AM".into(),
            results: vec![ReportRecord::failure("São Paulo")],
        };

        log.append(&entry).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"timestamp\""), "{text}");
        assert!(text.contains("São Paulo not found"));
        assert!(text.contains("\"temp\": \"-\""));
    }

    #[test]
    fn record_keys_keep_declared_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        BatchLog::new(&path).append(&batch("t")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let keys = ["\"city\"", "\"temp\"", "\"humidity\"", "\"description\"", "\"country\"", "\"status\""];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }
}

//! Text record ingestion into a [`MemoryStore`].
//!
//! Two line formats are accepted:
//! - file lines: `Patient ID: 1, Timestamp: 1714376789050, Label: ECG, Data: 0.42`
//! - compact messages: `1,1714376789050,ECG,0.42`
//!
//! `%` suffixes on values are stripped. Manual alert labels may carry a
//! non-numeric value (`triggered`, `resolved`), which is stored as `0.0`.

use crate::measurement::Measurement;
use crate::metrics::METRICS;
use crate::store::MemoryStore;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parses one line of a record file.
pub fn parse_file_line(line: &str) -> Result<Measurement> {
    let parts = split_fields(line)?;

    let subject_id = field_value(parts[0], "Patient ID")?
        .parse::<i32>()
        .context("invalid patient id")?;
    let timestamp = field_value(parts[1], "Timestamp")?
        .parse::<i64>()
        .context("invalid timestamp")?;
    let label = field_value(parts[2], "Label")?;
    let value = parse_value(label, field_value(parts[3], "Data")?)?;

    Ok(Measurement::new(subject_id, value, label, timestamp))
}

/// Parses one compact `<id>,<timestamp>,<label>,<value>` message.
pub fn parse_message(message: &str) -> Result<Measurement> {
    let parts = split_fields(message)?;

    let subject_id = parts[0].parse::<i32>().context("invalid patient id")?;
    let timestamp = parts[1].parse::<i64>().context("invalid timestamp")?;
    let label = parts[2];
    let value = parse_value(label, parts[3])?;

    Ok(Measurement::new(subject_id, value, label, timestamp))
}

// Trailing empty fields are dropped, so "a, b, c, d," still has four.
fn split_fields(line: &str) -> Result<Vec<&str>> {
    let mut parts: Vec<&str> = line.split(',').map(str::trim).collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    if parts.len() != 4 {
        bail!("expected 4 fields, found {}", parts.len());
    }
    Ok(parts)
}

// "Label: ECG" -> "ECG"
fn field_value<'a>(part: &'a str, name: &str) -> Result<&'a str> {
    part.split_once(':')
        .map(|(_, value)| value.trim())
        .with_context(|| format!("missing '{}:' field", name))
}

fn parse_value(label: &str, raw: &str) -> Result<f64> {
    let raw = raw.replace('%', "");
    let is_manual = label.eq_ignore_ascii_case("Alert") || label.eq_ignore_ascii_case("ManualAlert");
    raw.trim()
        .parse::<f64>()
        .or_else(|e| if is_manual { Ok(0.0) } else { Err(e) })
        .with_context(|| format!("invalid value '{}'", raw))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSummary {
    pub files: usize,
    pub records: usize,
    pub skipped: usize,
    /// Files or directories that could not be read.
    pub failed: usize,
}

/// Loads every `*.txt` file under a directory, recursively.
pub struct FileRecordReader {
    directory: PathBuf,
}

impl FileRecordReader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Reads all record files into `store`. Malformed lines and unreadable
    /// files are logged and skipped. A missing directory is logged and reads
    /// nothing. Only a failure to list the top-level directory is an error.
    pub fn read_into(&self, store: &mut MemoryStore) -> Result<ReadSummary> {
        let mut summary = ReadSummary::default();
        if !self.directory.is_dir() {
            warn!(directory = %self.directory.display(), "Invalid data directory");
            return Ok(summary);
        }

        let entries = fs::read_dir(&self.directory)
            .with_context(|| format!("Failed to list directory {}", self.directory.display()))?;
        let mut files = Vec::new();
        collect_record_files(entries, &mut files, &mut summary);
        files.sort();

        for path in files {
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    read_lines(&path, &contents, store, &mut summary);
                    summary.files += 1;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Error reading file");
                    summary.failed += 1;
                }
            }
        }

        METRICS.record_skipped(summary.skipped);
        info!(
            directory = %self.directory.display(),
            files = summary.files,
            records = summary.records,
            skipped = summary.skipped,
            failed = summary.failed,
            "📥 Loaded record files"
        );
        Ok(summary)
    }
}

fn read_lines(path: &Path, contents: &str, store: &mut MemoryStore, summary: &mut ReadSummary) {
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_file_line(line) {
            Ok(measurement) => {
                store.add(measurement);
                summary.records += 1;
            }
            Err(e) => {
                warn!(
                    file = %path.display(),
                    line = line_no + 1,
                    error = %e,
                    "Skipping invalid record"
                );
                summary.skipped += 1;
            }
        }
    }
    debug!(file = %path.display(), "Read record file");
}

fn collect_record_files(entries: fs::ReadDir, out: &mut Vec<PathBuf>, summary: &mut ReadSummary) {
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(error = %e, "Error reading directory entry");
                summary.failed += 1;
                continue;
            }
        };
        if path.is_dir() {
            match fs::read_dir(&path) {
                Ok(nested) => collect_record_files(nested, out, summary),
                Err(e) => {
                    warn!(directory = %path.display(), error = %e, "Error reading directory");
                    summary.failed += 1;
                }
            }
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::SignalType;

    #[test]
    fn test_parse_file_line() {
        let m = parse_file_line(
            "Patient ID: 12, Timestamp: 1714376789050, Label: OxygenSaturation, Data: 95.0%",
        )
        .unwrap();
        assert_eq!(m.subject_id, 12);
        assert_eq!(m.timestamp, 1714376789050);
        assert_eq!(m.signal, SignalType::OxygenSaturation);
        assert_eq!(m.value, 95.0);
    }

    #[test]
    fn test_manual_alert_text_value() {
        let m = parse_file_line("Patient ID: 3, Timestamp: 5, Label: Alert, Data: triggered").unwrap();
        assert_eq!(m.signal, SignalType::Alert);
        assert_eq!(m.value, 0.0);
    }

    #[test]
    fn test_non_numeric_vital_is_rejected() {
        assert!(parse_file_line("Patient ID: 3, Timestamp: 5, Label: ECG, Data: high").is_err());
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        assert!(parse_file_line("Patient ID: 3, Timestamp: 5, Label: ECG").is_err());
        assert!(parse_message("1,2,3").is_err());
    }

    #[test]
    fn test_trailing_comma_is_tolerated() {
        let m = parse_file_line("Patient ID: 3, Timestamp: 5, Label: ECG, Data: 0.8,").unwrap();
        assert_eq!(m.value, 0.8);
        assert_eq!(parse_message("3,5,ECG,0.8,,").unwrap().signal, SignalType::Ecg);
        assert!(parse_file_line("Patient ID: 3, Timestamp: 5, Label: ECG, Data: 0.8, x").is_err());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.txt"),
            "Patient ID: 1, Timestamp: 10, Label: ECG, Data: 0.5\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.txt"), b"Patient ID: 1, Data: \xff\xfe\n").unwrap();
        fs::write(
            dir.path().join("c.txt"),
            "Patient ID: 2, Timestamp: 20, Label: ECG, Data: 0.7\n",
        )
        .unwrap();

        let mut store = MemoryStore::new();
        let summary = FileRecordReader::new(dir.path()).read_into(&mut store).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.records, 2);
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn test_parse_message() {
        let m = parse_message(" 7 , 1000 , DiastolicPressure , 82.5 ").unwrap();
        assert_eq!(m.subject_id, 7);
        assert_eq!(m.timestamp, 1000);
        assert_eq!(m.signal, SignalType::DiastolicPressure);
        assert_eq!(m.value, 82.5);
    }

    #[test]
    fn test_missing_directory_reads_nothing() {
        let mut store = MemoryStore::new();
        let summary = FileRecordReader::new("no/such/dir")
            .read_into(&mut store)
            .unwrap();
        assert_eq!(summary, ReadSummary::default());
        assert_eq!(store.subject_count(), 0);
    }
}

//! Reading-history export discovery and loading.
//!
//! An export is either a `.json` file holding an array of record objects
//! (the shape returned by the database pass-through endpoint) or a `.jsonl`
//! file with one record object per line. A directory is scanned recursively
//! and every export inside it is loaded in path order.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use reads_core::error::{ReadsError, Result};
use reads_core::models::RawRecord;
use serde_json::Value;
use tracing::{debug, warn};

// ── RecordSource ──────────────────────────────────────────────────────────────

/// Anything that can supply the raw reading history.
pub trait RecordSource {
    /// Fetch every raw record, in source order.
    fn fetch(&self) -> Result<Vec<RawRecord>>;
}

/// A [`RecordSource`] backed by an export file or a directory of exports.
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileRecordSource {
    fn fetch(&self) -> Result<Vec<RawRecord>> {
        load_raw_records(&self.path)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve the data path: use `data_path` when given, otherwise fall back
/// to `~/.my-reads/data`.
pub fn resolve_data_path(data_path: Option<&Path>) -> PathBuf {
    if let Some(p) = data_path {
        return p.to_path_buf();
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".my-reads").join("data")
}

/// Find all `.json` / `.jsonl` files recursively under `dir`, sorted by path.
pub fn find_export_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_export_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load raw records from a single export file or a directory of exports.
///
/// For a directory, files that fail to load are logged and skipped; the call
/// only fails when the directory holds no export files at all.
pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(ReadsError::DataPathNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        return load_export_file(path);
    }

    let files = find_export_files(path);
    if files.is_empty() {
        return Err(ReadsError::NoDataFiles(path.to_path_buf()));
    }

    let mut all_records = Vec::new();
    for file_path in &files {
        match load_export_file(file_path) {
            Ok(records) => all_records.extend(records),
            Err(e) => warn!("Skipping export {}: {}", file_path.display(), e),
        }
    }

    debug!(
        "Loaded {} records from {} files",
        all_records.len(),
        files.len()
    );
    Ok(all_records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_export_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "json" || ext == "jsonl")
        .unwrap_or(false)
}

fn load_export_file(path: &Path) -> Result<Vec<RawRecord>> {
    if path.extension().map(|ext| ext == "jsonl").unwrap_or(false) {
        load_jsonl_file(path)
    } else {
        load_json_file(path)
    }
}

fn load_json_file(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| ReadsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content)?;
    records_from_value(value)
}

fn load_jsonl_file(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).map_err(|source| ReadsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = std::io::BufReader::new(file);
    let mut records = Vec::new();
    let mut lines_skipped = 0u64;

    for line_result in reader.lines() {
        let line = line_result.map_err(|source| ReadsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => records.push(map),
            Ok(_) => lines_skipped += 1,
            Err(e) => {
                debug!("Failed to parse JSON line in {}: {}", path.display(), e);
                lines_skipped += 1;
            }
        }
    }

    debug!(
        "File {}: {} records, {} lines skipped",
        path.display(),
        records.len(),
        lines_skipped
    );
    Ok(records)
}

/// Accept an array of objects. A bare `{"error": ...}` object is what the
/// pass-through endpoint returns when its query fails.
fn records_from_value(value: Value) -> Result<Vec<RawRecord>> {
    match value {
        Value::Array(items) => {
            let total = items.len();
            let records: Vec<RawRecord> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if records.len() < total {
                warn!("Ignored {} non-object entries", total - records.len());
            }
            Ok(records)
        }
        Value::Object(map) => match map.get("error") {
            Some(err) => Err(ReadsError::InvalidRecordShape(format!(
                "data source reported an error: {}",
                err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string())
            ))),
            None => Err(ReadsError::InvalidRecordShape(
                "expected an array of records, found an object".to_string(),
            )),
        },
        other => Err(ReadsError::InvalidRecordShape(format!(
            "expected an array of records, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

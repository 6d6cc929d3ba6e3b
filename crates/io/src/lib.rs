//! `paperstack-io` — the store adapter.
//!
//! Owns file formats, encoding fallback, and schema-driven field coercion.
//! The merge engine never touches raw file bytes; it sees only the record
//! lists produced here.

pub mod backup;
pub mod csv;
pub mod error;
pub mod json;

use std::path::Path;

use paperstack_config::SchemaConfig;
use paperstack_record::Record;

pub use backup::backup_file;
pub use error::StoreError;

/// Read a collection file, dispatching on extension.
pub fn read_collection(path: &Path, schema: &SchemaConfig) -> Result<Vec<Record>, StoreError> {
    match extension(path) {
        Some("csv") => csv::read_csv(path, schema),
        Some("json") => json::read_json(path, schema),
        _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Write a collection file, dispatching on extension. Rewrites the header /
/// meta structure from the schema every time.
pub fn write_collection(
    path: &Path,
    records: &[Record],
    schema: &SchemaConfig,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
    }
    match extension(path) {
        Some("csv") => csv::write_csv(path, records, schema),
        Some("json") => json::write_json(path, records, schema),
        _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str()).map(|e| {
        // compare case-insensitively without allocating for the common case
        if e.chars().all(|c| c.is_ascii_lowercase()) {
            e
        } else {
            match e.to_ascii_lowercase().as_str() {
                "csv" => "csv",
                "json" => "json",
                _ => "",
            }
        }
    })
}

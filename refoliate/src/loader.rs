//! JSON record loader
//!
//! Recursively discovers exported `*.json` files under a source directory
//! and produces a flat mapping from record id to parsed payload. Any
//! unreadable file, invalid JSON document, missing id, or duplicate id
//! aborts the run before any contact with FOLIO.

use crate::error::{RestoreError, Result};
use crate::records::RawRecord;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Load every JSON record under `root` into an id-keyed map
///
/// The map is ordered lexicographically by id, which makes sibling order in
/// the hierarchy (and therefore replay order) deterministic across runs.
pub fn load_records(root: &Path) -> Result<BTreeMap<String, RawRecord>> {
    let mut records = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            let source = e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
            });
            RestoreError::Read { path, source }
        })?;

        if !entry.file_type().is_file() || !is_json_file(entry.path()) {
            continue;
        }

        let record = load_file(entry.path())?;
        tracing::debug!(path = %entry.path().display(), id = %record.id, "read record file");

        if let Some(previous) = records.insert(record.id.clone(), record) {
            return Err(RestoreError::DuplicateId {
                id: previous.id,
                path: entry.path().to_path_buf(),
            });
        }
    }

    tracing::info!(
        "Read a total of {} JSON record(s) from {}",
        records.len(),
        root.display()
    );

    Ok(records)
}

fn load_file(path: &Path) -> Result<RawRecord> {
    let text = std::fs::read_to_string(path).map_err(|e| RestoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let body: Value = serde_json::from_str(&text).map_err(|e| RestoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let id = body
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RestoreError::MissingId {
            path: path.to_path_buf(),
        })?;

    Ok(RawRecord { id, body })
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

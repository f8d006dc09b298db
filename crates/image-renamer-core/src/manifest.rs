//! Manifest loading.
//!
//! The manifest is a delimited text file with a single header line. Rows are
//! returned as-is; whether a row can be acted on is decided later by
//! [`ManifestRow::actionable`].

use log::{info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{ManifestRow, ID_COLUMN, IMAGE_COLUMN};

/// Parse the manifest at `path` into rows, field names taken from the header line.
pub fn load_manifest(path: &Path, separator: u8) -> Result<Vec<ManifestRow>> {
    let read_error = |e: csv::Error| Error::ManifestRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .map(str::to_string)
        .collect();

    for required in [IMAGE_COLUMN, ID_COLUMN] {
        if !headers.is_empty() && !headers.iter().any(|h| h == required) {
            warn!(
                "Manifest {} has no {} column; its rows will be skipped",
                path.display(),
                required
            );
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let fields = record
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let name = headers
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("_{}", i));
                (name, value.to_string())
            })
            .collect();
        rows.push(ManifestRow::new(fields));
    }

    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Find the manifest to use in `dir`: the first `.csv` file by name.
///
/// When several candidates exist all of them are logged and the first is used.
pub fn locate_manifest(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }

    let candidates: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();

    let first = candidates
        .first()
        .cloned()
        .ok_or_else(|| Error::ManifestNotFound(dir.to_path_buf()))?;

    if candidates.len() > 1 {
        let all: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        warn!(
            "Found {} .csv files, only {} will be used. Candidates: {}",
            candidates.len(),
            first.display(),
            all.join(", ")
        );
    }

    Ok(first)
}

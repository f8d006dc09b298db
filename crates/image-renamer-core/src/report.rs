use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateTable;
use crate::error::{Error, Result};

/// Lists every demoted manifest row, one JSON object per line
pub const DUPLICATE_REPORT: &str = "repeatingCSV.txt";

/// Lists every manifest image name that was not found, one per line
pub const UNMATCHED_REPORT: &str = "notRenamedImages.txt";

/// Write the duplicate-row report. Nothing is written when the table is empty.
pub fn write_duplicate_report(dir: &Path, duplicates: &DuplicateTable) -> Result<Option<PathBuf>> {
    if duplicates.is_empty() {
        return Ok(None);
    }

    let path = dir.join(DUPLICATE_REPORT);
    let lines = duplicates
        .demoted_rows()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Report {
            path: path.clone(),
            source: io::Error::other(e),
        })?;

    write_lines(&path, &lines)?;
    warn!(
        "{} repeated image names in the manifest; an extra copy is made for each repeat. Rows listed in {}",
        duplicates.len(),
        path.display()
    );
    Ok(Some(path))
}

/// Write the unmatched-image report. Nothing is written when every image was found.
pub fn write_unmatched_report(dir: &Path, unmatched: &[&str]) -> Result<Option<PathBuf>> {
    if unmatched.is_empty() {
        return Ok(None);
    }

    let path = dir.join(UNMATCHED_REPORT);
    write_lines(&path, unmatched)?;
    warn!(
        "{} images named in the manifest were not found; names listed in {}",
        unmatched.len(),
        path.display()
    );
    Ok(Some(path))
}

fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let report_error = |source| Error::Report {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(report_error)?;
    }

    let lines: Vec<&str> = lines.iter().map(|line| line.as_ref()).collect();
    let contents = lines.join("\n");
    fs::write(path, contents).map_err(report_error)?;

    info!("Report written: {}", path.display());
    Ok(())
}

use crossbeam::channel::Sender;
use log::{debug, warn};
use std::fs;

use crate::discovery::ImageIndex;
use crate::duplicates::DuplicateTable;
use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::{ImageRecord, ManifestRow, Outcome};

/// Turns a manifest row into its outcome. Shared by every worker thread.
pub trait RowResolver: Sync {
    fn resolve(&self, row: &ManifestRow) -> Outcome;
}

/// Resolves rows against the image tree on disk
#[derive(Debug, Clone, Copy)]
pub struct FileResolver<'a> {
    pub index: &'a ImageIndex,
    pub duplicates: &'a DuplicateTable,
    pub dry_run: bool,
}

impl RowResolver for FileResolver<'_> {
    fn resolve(&self, row: &ManifestRow) -> Outcome {
        resolve_row(row, self.index, self.duplicates, self.dry_run)
    }
}

/// Everything one worker needs; all of it is borrowed read-only
#[derive(Clone, Copy)]
pub struct WorkerInput<'a> {
    pub chunk: usize,
    pub rows: &'a [ManifestRow],
    pub resolver: &'a dyn RowResolver,
}

/// Sent to the coordinator once per processed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerMessage {
    pub chunk: usize,
    pub outcome: Outcome,
}

/// Resolve every row of the chunk in order, reporting each outcome as it lands.
///
/// Returns the number of rows processed. Fails only if the coordinator has gone away.
pub fn run_worker(input: WorkerInput<'_>, sender: &Sender<WorkerMessage>) -> Result<usize> {
    debug!(
        "Worker {} starting on {} rows",
        input.chunk + 1,
        input.rows.len()
    );

    for row in input.rows {
        let outcome = input.resolver.resolve(row);
        sender
            .send(WorkerMessage {
                chunk: input.chunk,
                outcome,
            })
            .map_err(|_| {
                Error::Worker(format!(
                    "worker {} lost its coordinator channel",
                    input.chunk + 1
                ))
            })?;
    }

    debug!("Worker {} finished", input.chunk + 1);
    Ok(input.rows.len())
}

/// Resolve one manifest row against the index.
///
/// Fan-out copies for repeated image names are made before the rename,
/// since the rename removes the file they read from.
pub fn resolve_row(
    row: &ManifestRow,
    index: &ImageIndex,
    duplicates: &DuplicateTable,
    dry_run: bool,
) -> Outcome {
    let Some((image_name, id)) = row.actionable() else {
        return Outcome::Skipped;
    };

    let Some(image) = index.find(image_name) else {
        return Outcome::NotFound {
            image_name: image_name.to_string(),
        };
    };

    let extra_rows = duplicates.get(image_name).unwrap_or_default();
    let copies = copy_for_duplicates(image, extra_rows, dry_run);

    // A repeated row naming the image after itself means the source must stay
    let keep_source = extra_rows
        .iter()
        .filter_map(ManifestRow::id)
        .any(|extra_id| !extra_id.is_empty() && image.sibling_path(extra_id) == image.full_path);

    match rename_image(image, id, keep_source, dry_run) {
        Ok(()) => Outcome::Renamed {
            image: image.clone(),
            copies,
        },
        Err(e) => Outcome::Failed {
            image: image.clone(),
            reason: e.to_string(),
        },
    }
}

/// Copy `image` once per extra row, named after that row's id. Returns the
/// number of extra files the row's ids produce.
fn copy_for_duplicates(image: &ImageRecord, extra_rows: &[ManifestRow], dry_run: bool) -> usize {
    let mut copies = 0;

    for extra in extra_rows {
        let Some(id) = extra.id().filter(|id| !id.is_empty()) else {
            warn!(
                "Repeated row for {} has no ID, no copy made",
                image.base_name
            );
            continue;
        };

        let target = image.sibling_path(id);
        if target == image.full_path {
            debug!("{} already carries ID {}, kept in place", image.base_name, id);
            copies += 1;
            continue;
        }

        if dry_run {
            log_fs_modification(
                "copy (dry run)",
                &target,
                Some(&format!("from {}", image.full_path.display())),
            );
            copies += 1;
            continue;
        }

        match fs::copy(&image.full_path, &target) {
            Ok(_) => {
                log_fs_modification(
                    "copy",
                    &target,
                    Some(&format!("from {}", image.full_path.display())),
                );
                copies += 1;
            }
            Err(e) => log_file_error(&target, "copy", &e),
        }
    }

    copies
}

/// Give `image` the name `id`. When `keep_source` is set the file is copied
/// instead, leaving the original name in place.
fn rename_image(
    image: &ImageRecord,
    id: &str,
    keep_source: bool,
    dry_run: bool,
) -> std::io::Result<()> {
    let target = image.sibling_path(id);
    if target == image.full_path {
        debug!("{} already carries ID {}", image.base_name, id);
        return Ok(());
    }

    let operation = if keep_source { "copy" } else { "rename" };
    let details = format!("from {}", image.full_path.display());

    if dry_run {
        log_fs_modification(&format!("{} (dry run)", operation), &target, Some(&details));
        return Ok(());
    }

    let result = if keep_source {
        fs::copy(&image.full_path, &target).map(|_| ())
    } else {
        fs::rename(&image.full_path, &target)
    };
    result.inspect_err(|e| {
        log_file_error(&image.full_path, operation, e);
    })?;
    log_fs_modification(operation, &target, Some(&details));
    Ok(())
}

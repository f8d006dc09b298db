use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::logging::{log_file_error, log_fs_modification};
use crate::types::ImageRecord;

/// What happened to the leftover images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Destination of every image that was moved
    pub moved: Vec<PathBuf>,

    /// Source path and error of every image that could not be moved
    pub failures: Vec<(PathBuf, String)>,
}

/// Where `image` goes inside the quarantine directory, mirroring its path under `images_root`
pub fn quarantine_path(image: &ImageRecord, images_root: &Path, quarantine_dir: &Path) -> PathBuf {
    match image.full_path.strip_prefix(images_root) {
        Ok(relative) => quarantine_dir.join(relative),
        Err(_) => quarantine_dir.join(&image.base_name),
    }
}

/// Move every leftover into the quarantine directory.
///
/// Each move is independent; a failure is recorded and the rest still go ahead.
pub fn relocate_leftovers(
    leftovers: &[&ImageRecord],
    images_root: &Path,
    quarantine_dir: &Path,
    dry_run: bool,
) -> RelocationReport {
    if leftovers.is_empty() {
        return RelocationReport::default();
    }

    if dry_run {
        for image in leftovers {
            let target = quarantine_path(image, images_root, quarantine_dir);
            log_fs_modification(
                "move (dry run)",
                &target,
                Some(&format!("from {}", image.full_path.display())),
            );
        }
        return RelocationReport::default();
    }

    let results: Vec<(PathBuf, io::Result<PathBuf>)> = leftovers
        .par_iter()
        .map(|image| {
            let target = quarantine_path(image, images_root, quarantine_dir);
            let result = move_file(&image.full_path, &target).map(|()| target);
            (image.full_path.clone(), result)
        })
        .collect();

    let mut report = RelocationReport::default();
    for (source, result) in results {
        match result {
            Ok(target) => {
                log_fs_modification(
                    "move",
                    &target,
                    Some(&format!("from {}", source.display())),
                );
                report.moved.push(target);
            }
            Err(e) => {
                log_file_error(&source, "quarantine", &e);
                report.failures.push((source, e.to_string()));
            }
        }
    }

    info!(
        "Moved {} unused images to {}",
        report.moved.len(),
        quarantine_dir.display()
    );
    if !report.failures.is_empty() {
        warn!("{} unused images could not be moved", report.failures.len());
    }

    report
}

/// Rename `source` to `target`, creating parent directories. Falls back to
/// copy and remove when a plain rename is impossible, e.g. across devices.
/// An existing file at `target` is never replaced.
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    if target.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            if !source.is_file() {
                return Err(rename_error);
            }
            fs::copy(source, target)?;
            fs::remove_file(source)
        }
    }
}

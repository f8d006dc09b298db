//! Rename image files from a semicolon-delimited manifest.
//!
//! This library provides the components of a rename run:
//! - Manifest loading and duplicate resolution
//! - Image discovery and lookup by file name
//! - Parallel reconciliation of rows against images
//! - Quarantine of images the manifest never mentions
//! - Report files for repeated and unmatched rows

// -- External Dependencies --
use log::{error, info, warn};
use std::path::PathBuf;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod config;
pub mod discovery;
pub mod duplicates;
pub mod logging;
pub mod manifest;
pub mod progress;
pub mod quarantine;
pub mod reconcile;
pub mod report;
pub mod types;

use progress::{ChunkProgress, NoProgress, ProgressSink};

/// Main entry point for a rename run
pub struct ImageRenamer {
    config: Config,
}

impl ImageRenamer {
    /// Create a new ImageRenamer, validating the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The manifest this run will read
    pub fn manifest_path(&self) -> Result<PathBuf> {
        match &self.config.manifest {
            Some(path) => Ok(path.clone()),
            None => manifest::locate_manifest(&self.config.manifest_dir),
        }
    }

    /// Run the full pipeline, drawing progress bars if configured
    pub fn run(&self) -> Result<RunSummary> {
        if self.config.show_progress {
            self.run_with_progress(&ChunkProgress::new())
        } else {
            self.run_with_progress(&NoProgress)
        }
    }

    /// Run the full pipeline, reporting row progress to `progress`
    pub fn run_with_progress(&self, progress: &dyn ProgressSink) -> Result<RunSummary> {
        let config = &self.config;
        if config.dry_run {
            info!("Dry run: no files will be changed");
        }

        // Load and split the manifest
        let manifest_path = self.manifest_path()?;
        info!("Checking manifest {}...", manifest_path.display());
        let rows = manifest::load_manifest(&manifest_path, config.separator_byte()?)?;
        let total_rows = rows.len();

        let (unique_rows, duplicates) = duplicates::resolve_duplicates(rows);
        let duplicate_report = report::write_duplicate_report(&config.reports_dir, &duplicates)
            .unwrap_or_else(|e| {
                error!("{}", e);
                None
            });

        // Index the image tree
        info!("Scanning images in {}...", config.images_dir.display());
        let index = discovery::discover_images(&config.images_dir)?;
        info!("Found {} images", index.len());

        // Rename
        let reconciliation = reconcile::reconcile(
            &unique_rows,
            &index,
            &duplicates,
            config.workers,
            config.dry_run,
            progress,
        )?;

        let unmatched = reconciliation.unmatched_images();
        let unmatched_report = report::write_unmatched_report(&config.reports_dir, &unmatched)
            .unwrap_or_else(|e| {
                error!("{}", e);
                None
            });

        // Quarantine everything the manifest never used
        let used = reconciliation.used_images();
        let leftovers = reconcile::leftover_images(&index, &used);
        if !leftovers.is_empty() {
            warn!(
                "{} images are not referenced by the manifest and will be moved to {}",
                leftovers.len(),
                config.quarantine_dir.display()
            );
        }
        let relocation = quarantine::relocate_leftovers(
            &leftovers,
            &config.images_dir,
            &config.quarantine_dir,
            config.dry_run,
        );

        let summary = RunSummary {
            manifest: manifest_path,
            total_rows,
            unique_rows: unique_rows.len(),
            duplicate_rows: duplicates.row_count(),
            duplicate_images: duplicates.len(),
            images_indexed: index.len(),
            renamed: reconciliation.renamed(),
            copies: reconciliation.copies(),
            skipped: reconciliation.skipped(),
            not_found: unmatched.len(),
            failed: reconciliation.failed(),
            leftovers: leftovers.len(),
            relocation_failures: relocation.failures.len(),
            duplicate_report,
            unmatched_report,
        };

        info!("Run complete: {:?}", summary);
        Ok(summary)
    }
}

use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::Result;
use crate::types::ImageRecord;

/// Every file found under the image root, with a lookup by base name.
///
/// When the same base name exists in several directories the first one
/// discovered wins the lookup; the others stay in `records` and can only end
/// up as leftovers.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    records: Vec<ImageRecord>,
    by_name: HashMap<String, usize>,
}

impl ImageIndex {
    /// Build an index from records in discovery order
    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if let Some(&first) = by_name.get(&record.base_name) {
                let first: &ImageRecord = &records[first];
                warn!(
                    "Image name {} is used by both {} and {}; only the first will be matched",
                    record.base_name,
                    first.full_path.display(),
                    record.full_path.display()
                );
                continue;
            }
            by_name.insert(record.base_name.clone(), position);
        }

        Self { records, by_name }
    }

    /// First image discovered with this base name
    pub fn find(&self, base_name: &str) -> Option<&ImageRecord> {
        self.by_name.get(base_name).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Recursively index every regular file under `root`.
///
/// A missing root yields an empty index.
pub fn discover_images(root: &Path) -> Result<ImageIndex> {
    if !root.exists() {
        warn!("Image directory {} does not exist", root.display());
        return Ok(ImageIndex::default());
    }

    let records: Vec<ImageRecord> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                // Log error but continue with other files
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| ImageRecord::from_path(entry.path()))
        .collect();

    info!("Found {} images under {}", records.len(), root.display());
    Ok(ImageIndex::from_records(records))
}

// -- Tests --

use log::info;
use std::collections::{HashMap, HashSet};

use crate::types::ManifestRow;

/// Rows that repeat an already-seen image name, grouped by that name.
///
/// The first row for a name is never stored here; it stays in the unique set
/// and drives the rename. Keys iterate in the order they first gained a
/// duplicate.
#[derive(Debug, Clone, Default)]
pub struct DuplicateTable {
    keys: Vec<String>,
    rows: HashMap<String, Vec<ManifestRow>>,
}

impl DuplicateTable {
    fn push(&mut self, image: &str, row: ManifestRow) {
        match self.rows.get_mut(image) {
            Some(existing) => existing.push(row),
            None => {
                self.keys.push(image.to_string());
                self.rows.insert(image.to_string(), vec![row]);
            }
        }
    }

    /// Extra rows for `image`, if it was repeated
    pub fn get(&self, image: &str) -> Option<&[ManifestRow]> {
        self.rows.get(image).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct repeated image names
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Total number of demoted rows across all keys
    pub fn row_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// Iterate `(image, extra rows)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ManifestRow])> {
        self.keys
            .iter()
            .map(move |key| (key.as_str(), self.rows[key].as_slice()))
    }

    /// Every demoted row, grouped by key in insertion order
    pub fn demoted_rows(&self) -> impl Iterator<Item = &ManifestRow> {
        self.iter().flat_map(|(_, rows)| rows.iter())
    }
}

/// Split rows into the first row per image name and a table of the repeats.
///
/// Names compare exactly; a missing `IMAGE` field is keyed as the empty string.
pub fn resolve_duplicates(rows: Vec<ManifestRow>) -> (Vec<ManifestRow>, DuplicateTable) {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut unique = Vec::with_capacity(rows.len());
    let mut duplicates = DuplicateTable::default();

    for row in rows {
        let image = row.image().unwrap_or("").to_string();
        if seen.contains(&image) {
            duplicates.push(&image, row);
        } else {
            seen.insert(image);
            unique.push(row);
        }
    }

    if !duplicates.is_empty() {
        info!(
            "{} image names repeat in the manifest ({} extra rows)",
            duplicates.len(),
            duplicates.row_count()
        );
    }

    (unique, duplicates)
}

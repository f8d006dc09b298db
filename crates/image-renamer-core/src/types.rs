use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};

/// Column holding the source image file name
pub const IMAGE_COLUMN: &str = "IMAGE";

/// Column holding the identifier the image is renamed to
pub const ID_COLUMN: &str = "ID";

/// One data line of the manifest, fields kept in header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRow {
    fields: Vec<(String, String)>,
}

impl ManifestRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Build a row holding only the image and id columns
    pub fn with_image_and_id(image: &str, id: &str) -> Self {
        Self::new(vec![
            (IMAGE_COLUMN.to_string(), image.to_string()),
            (ID_COLUMN.to_string(), id.to_string()),
        ])
    }

    /// Value of the named column, if the row has it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn image(&self) -> Option<&str> {
        self.get(IMAGE_COLUMN)
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_COLUMN)
    }

    /// Image and id, when both are present and non-empty
    pub fn actionable(&self) -> Option<(&str, &str)> {
        match (self.image(), self.id()) {
            (Some(image), Some(id)) if !image.is_empty() && !id.is_empty() => Some((image, id)),
            _ => None,
        }
    }
}

// Serialized as a flat JSON object so the duplicate report mirrors the manifest line
impl Serialize for ManifestRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An image file discovered under the image root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRecord {
    /// File name with extension, the join key against manifest rows
    pub base_name: String,

    /// Directory containing the file
    pub directory: PathBuf,

    /// Extension including the leading dot, empty when the file has none
    pub extension: String,

    /// Full path to the file
    pub full_path: PathBuf,
}

impl ImageRecord {
    /// Build a record from a file path. Returns `None` for paths without a file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let base_name = path.file_name()?.to_string_lossy().into_owned();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        Some(Self {
            base_name,
            directory,
            extension,
            full_path: path.to_path_buf(),
        })
    }

    /// Sibling path named after `id`, keeping this image's directory and extension
    pub fn sibling_path(&self, id: &str) -> PathBuf {
        self.directory.join(format!("{}{}", id, self.extension))
    }
}

/// Result of resolving one manifest row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The image was renamed after `copies` fan-out copies were made
    Renamed { image: ImageRecord, copies: usize },

    /// The manifest names an image that is not in the index
    NotFound { image_name: String },

    /// The row lacks an image or an id
    Skipped,

    /// The image was matched but renaming it failed
    Failed { image: ImageRecord, reason: String },
}

impl Outcome {
    /// The image this outcome consumed, if any
    pub fn used_image(&self) -> Option<&ImageRecord> {
        match self {
            Self::Renamed { image, .. } | Self::Failed { image, .. } => Some(image),
            Self::NotFound { .. } | Self::Skipped => None,
        }
    }
}

/// Counts and report locations produced by a full run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub manifest: PathBuf,
    pub total_rows: usize,
    pub unique_rows: usize,
    pub duplicate_rows: usize,
    pub duplicate_images: usize,
    pub images_indexed: usize,
    pub renamed: usize,
    pub copies: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
    pub leftovers: usize,
    pub relocation_failures: usize,
    pub duplicate_report: Option<PathBuf>,
    pub unmatched_report: Option<PathBuf>,
}

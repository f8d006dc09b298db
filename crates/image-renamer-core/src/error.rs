use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the image-renamer library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest could not be opened or streamed
    #[error("Failed to read manifest {}: {reason}", path.display())]
    ManifestRead { path: PathBuf, reason: String },

    /// No manifest was given and none could be located
    #[error("No .csv manifest found in {0}")]
    ManifestNotFound(PathBuf),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A reconciliation worker terminated abnormally
    #[error("Worker failed: {0}")]
    Worker(String),

    /// A report file could not be written
    #[error("Failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

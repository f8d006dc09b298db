use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Configuration for a rename run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of reconciliation workers
    pub workers: usize,

    /// Explicit manifest path; when unset the first `.csv` in `manifest_dir` is used
    pub manifest: Option<PathBuf>,

    /// Directory searched for a manifest when none is given
    pub manifest_dir: PathBuf,

    /// Field separator used by the manifest
    pub separator: char,

    /// Root of the image tree to scan
    pub images_dir: PathBuf,

    /// Where images never referenced by the manifest are moved
    pub quarantine_dir: PathBuf,

    /// Directory receiving `repeatingCSV.txt` and `notRenamedImages.txt`
    pub reports_dir: PathBuf,

    /// Whether to run without making changes
    pub dry_run: bool,

    /// Whether to draw per-worker progress bars
    pub show_progress: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 2,
            manifest: None,
            manifest_dir: PathBuf::from("."),
            separator: ';',
            images_dir: PathBuf::from("images"),
            quarantine_dir: PathBuf::from("NOT_USED_IMAGES"),
            reports_dir: PathBuf::from("."),
            dry_run: false,
            show_progress: true,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// The separator as the single byte the manifest reader expects.
    pub fn separator_byte(&self) -> Result<u8> {
        if self.separator.is_ascii() {
            Ok(self.separator as u8)
        } else {
            Err(Error::Configuration(format!(
                "Separator must be a single ASCII character, got {:?}",
                self.separator
            )))
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Configuration(
                "Worker count must be a positive integer".to_string(),
            ));
        }

        self.separator_byte()?;

        // Leftovers moved under the image root would be picked up by the next scan
        if normalize(&self.quarantine_dir)?.starts_with(normalize(&self.images_dir)?) {
            return Err(Error::Configuration(format!(
                "Quarantine directory {} must not be inside the image directory {}",
                self.quarantine_dir.display(),
                self.images_dir.display()
            )));
        }

        let cpus = num_cpus::get();
        if self.workers > cpus {
            warn!(
                "{} workers requested but only {} CPUs are available",
                self.workers, cpus
            );
        }

        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.workers, 2);
        assert_eq!(config.separator, ';');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = Config {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_non_ascii_separator_rejected() {
        let config = Config {
            separator: '¦',
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_quarantine_inside_images_rejected() {
        let config = Config {
            quarantine_dir: PathBuf::from("images/NOT_USED_IMAGES"),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_quarantine_inside_images_rejected_across_path_spellings() {
        let cwd = std::env::current_dir().unwrap();
        for (images, quarantine) in [
            (PathBuf::from("images"), PathBuf::from("./images/Q")),
            (PathBuf::from("./images"), PathBuf::from("images/sub/../Q")),
            (PathBuf::from("images"), cwd.join("images").join("Q")),
            (cwd.join("images"), PathBuf::from("images/Q")),
        ] {
            let config = Config {
                images_dir: images.clone(),
                quarantine_dir: quarantine.clone(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(Error::Configuration(_))),
                "{} inside {} was accepted",
                quarantine.display(),
                images.display()
            );
        }
    }

    #[test]
    fn test_quarantine_beside_images_accepted() {
        for quarantine in ["images/../NOT_USED_IMAGES", "images_old", "./NOT_USED_IMAGES"] {
            let config = Config {
                quarantine_dir: PathBuf::from(quarantine),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{} was rejected", quarantine);
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image-renamer.json");

        let config = Config {
            workers: 6,
            dry_run: true,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.workers, 6);
        assert!(loaded.dry_run);
        assert_eq!(loaded.quarantine_dir, PathBuf::from("NOT_USED_IMAGES"));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "workers": 4 }"#).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.workers, 4);
        assert_eq!(loaded.images_dir, PathBuf::from("images"));
        assert_eq!(loaded.log_level, LogLevel::Info);
    }
}

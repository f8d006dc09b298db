#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use image_renamer_core::Config;
use tempfile::TempDir;

/// A throwaway working directory laid out like a real run:
/// a manifest, an `images/` tree, and room for reports and quarantine.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn images(&self) -> PathBuf {
        self.root().join("images")
    }

    pub fn quarantine(&self) -> PathBuf {
        self.root().join("NOT_USED_IMAGES")
    }

    /// Write `manifest.csv` with the given lines, header first
    pub fn write_manifest(&self, lines: &[&str]) -> PathBuf {
        let path = self.root().join("manifest.csv");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    /// Create an image under `images/`, its contents set to its relative path
    pub fn add_image(&self, relative: &str) -> PathBuf {
        let path = self.images().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(&path).unwrap();
        file.write_all(relative.as_bytes()).unwrap();
        path
    }

    /// Config pointing every path into this workspace
    pub fn config(&self) -> Config {
        Config {
            manifest_dir: self.root().to_path_buf(),
            images_dir: self.images(),
            quarantine_dir: self.quarantine(),
            reports_dir: self.root().to_path_buf(),
            show_progress: false,
            ..Default::default()
        }
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root().join(relative).exists()
    }
}

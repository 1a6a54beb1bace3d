use std::path::PathBuf;

use crate::error::{KpiError, Result};

/// Source Provider: lists report files and hands back their bytes.
pub trait Source {
    fn list(&self) -> Result<Vec<String>>;
    fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Reports dropped into (or mounted at) a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Source for DirSource {
    /// Regular, non-hidden files sorted by name.
    fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            KpiError::Source(format!("cannot list {}: {e}", self.root.display()))
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            // Office lock files and dotfiles
            if name.starts_with('.') || name.starts_with("~$") {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        std::fs::read(&path)
            .map_err(|e| KpiError::Source(format!("cannot fetch {}: {e}", path.display())))
    }
}

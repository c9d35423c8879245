//! Layout store backed by a directory of RON files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tactics_core::error::{GameError, Result};
use tactics_core::layout::LayoutStore;

const EXTENSION: &str = "ron";

/// [`LayoutStore`] that keeps each layout in `<root>/<name>.ron`.
///
/// The directory is created on the first save.
#[derive(Debug, Clone)]
pub struct DirectoryLayoutStore {
    root: PathBuf,
}

impl DirectoryLayoutStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the layouts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(GameError::Storage(format!("invalid layout name '{name}'")));
        }
        Ok(self.root.join(format!("{name}.{EXTENSION}")))
    }
}

fn storage_error(path: &Path, err: &io::Error) -> GameError {
    GameError::Storage(format!("{}: {err}", path.display()))
}

impl LayoutStore for DirectoryLayoutStore {
    fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error(&path, &err)),
        }
    }

    fn save(&mut self, name: &str, encoded: &str) -> Result<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.root).map_err(|e| storage_error(&self.root, &e))?;
        fs::write(&path, encoded).map_err(|e| storage_error(&path, &e))?;
        tracing::debug!(path = %path.display(), "Layout written");
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(storage_error(&path, &err)),
        }
    }

    fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(storage_error(&self.root, &err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| storage_error(&self.root, &e))?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

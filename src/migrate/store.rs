//! file-backed content and flag stores
//!
//! `DirStore` treats a directory tree of content files as the item store:
//! ids are paths relative to the root. `FileFlagStore` persists the
//! migration-completed flag as a small JSON file written atomically
//! (write to temp, then rename).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::batch::{ContentStore, FlagStore};

/// persistence failures surfaced by the stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content item not found: {0}")]
    NotFound(String),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// content store over a directory of files
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    fn item_path(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// all content files under the root, as relative-path ids
    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        let mut files = Vec::new();
        self.walk(&self.root, &mut files)?;

        let mut ids: Vec<String> = files
            .iter()
            .filter_map(|p| p.strip_prefix(&self.root).ok())
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StoreError> {
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, out)?;
            } else if self.matches_extension(&path) {
                out.push(path);
            }
        }
        Ok(())
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x == e))
            .unwrap_or(false)
    }
}

impl ContentStore for DirStore {
    fn list_matching(&self, needle: &str) -> Result<Vec<String>, StoreError> {
        let mut matching = Vec::new();
        for id in self.ids()? {
            if self.load(&id)?.contains(needle) {
                matching.push(id);
            }
        }
        Ok(matching)
    }

    fn load(&self, id: &str) -> Result<String, StoreError> {
        let path = self.item_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::read_to_string(&path).map_err(|e| StoreError::io(path, e))
    }

    fn save(&self, id: &str, body: &str) -> Result<(), StoreError> {
        let path = self.item_path(id);
        fs::write(&path, body).map_err(|e| StoreError::io(path, e))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FlagData {
    #[serde(default)]
    migration_done: bool,
}

/// migration-completed flag persisted as a JSON file
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> FlagData {
        // missing or unreadable flag file means "not done yet"
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

impl FlagStore for FileFlagStore {
    fn migration_done(&self) -> bool {
        self.read().migration_done
    }

    fn set_migration_done(&self, done: bool) -> Result<(), StoreError> {
        let data = FlagData {
            migration_done: done,
        };
        let content =
            serde_json::to_string_pretty(&data).map_err(|e| StoreError::Encode {
                path: self.path.clone(),
                source: e,
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        // atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::schema::{Category, CategoryFile};

/// Per-category JSON files under one output directory. Writes replace the
/// category's file wholesale; there is no incremental merge.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.root.join(format!("{}.json", category.as_str()))
    }

    pub fn write(&self, file: &CategoryFile) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create output directory {}", self.root.display()))?;

        let path = self.path_for(file.category);
        let json = serde_json::to_string_pretty(file)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(path)
    }

    pub fn load(&self, category: Category) -> Result<CategoryFile> {
        let path = self.path_for(category);
        let json = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "no extracted data for '{}' at {} (run `extractor {}` first)",
                category,
                path.display(),
                category
            )
        })?;

        let file: CategoryFile = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(file)
    }

    /// Like `load`, but a missing file is not an error. Parse failures on
    /// an existing file still propagate.
    pub fn try_load(&self, category: Category) -> Result<Option<CategoryFile>> {
        if !self.path_for(category).exists() {
            return Ok(None);
        }
        self.load(category).map(Some)
    }
}

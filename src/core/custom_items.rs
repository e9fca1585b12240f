//! User-defined dropdown entries (materials, standards, couplants, ...)
//!
//! Stores are passed to whoever needs them; nothing here is global.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Repository of custom items keyed by category
pub trait CustomItemStore {
    /// Items in a category, in insertion order
    fn get(&self, category: &str) -> Result<Vec<String>, CustomItemError>;

    /// Add an item; returns false when it is already present
    fn add(&mut self, category: &str, item: &str) -> Result<bool, CustomItemError>;

    /// All categories with at least one item
    fn categories(&self) -> Result<Vec<String>, CustomItemError>;
}

#[derive(Debug, Error)]
pub enum CustomItemError {
    #[error("category name cannot be empty")]
    EmptyCategory,

    #[error("item cannot be empty")]
    EmptyItem,

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type ItemMap = BTreeMap<String, Vec<String>>;

fn normalize_category(category: &str) -> Result<String, CustomItemError> {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return Err(CustomItemError::EmptyCategory);
    }
    Ok(category)
}

fn insert_item(items: &mut ItemMap, category: &str, item: &str) -> Result<bool, CustomItemError> {
    let category = normalize_category(category)?;
    let item = item.trim();
    if item.is_empty() {
        return Err(CustomItemError::EmptyItem);
    }

    let entries = items.entry(category).or_default();
    let lowered = item.to_lowercase();
    if entries.iter().any(|e| e.to_lowercase() == lowered) {
        return Ok(false);
    }
    entries.push(item.to_string());
    Ok(true)
}

fn lookup(items: &ItemMap, category: &str) -> Result<Vec<String>, CustomItemError> {
    let category = normalize_category(category)?;
    Ok(items.get(&category).cloned().unwrap_or_default())
}

fn non_empty_categories(items: &ItemMap) -> Vec<String> {
    items
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, _)| k.clone())
        .collect()
}

/// In-memory store, mostly for tests and one-shot commands
#[derive(Debug, Default, Clone)]
pub struct MemoryItemStore {
    items: ItemMap,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CustomItemStore for MemoryItemStore {
    fn get(&self, category: &str) -> Result<Vec<String>, CustomItemError> {
        lookup(&self.items, category)
    }

    fn add(&mut self, category: &str, item: &str) -> Result<bool, CustomItemError> {
        insert_item(&mut self.items, category, item)
    }

    fn categories(&self) -> Result<Vec<String>, CustomItemError> {
        Ok(non_empty_categories(&self.items))
    }
}

/// Store backed by a YAML file, re-read on every call
#[derive(Debug, Clone)]
pub struct FileItemStore {
    path: PathBuf,
}

impl FileItemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ItemMap, CustomItemError> {
        if !self.path.exists() {
            return Ok(ItemMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ItemMap::new());
        }
        serde_yml::from_str::<Option<ItemMap>>(&content)
            .map(Option::unwrap_or_default)
            .map_err(|e| CustomItemError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    fn save(&self, items: &ItemMap) -> Result<(), CustomItemError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yml::to_string(items).map_err(|e| CustomItemError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CustomItemStore for FileItemStore {
    fn get(&self, category: &str) -> Result<Vec<String>, CustomItemError> {
        lookup(&self.load()?, category)
    }

    fn add(&mut self, category: &str, item: &str) -> Result<bool, CustomItemError> {
        let mut items = self.load()?;
        let added = insert_item(&mut items, category, item)?;
        if added {
            self.save(&items)?;
            tracing::debug!(path = %self.path.display(), category, item, "custom item added");
        }
        Ok(added)
    }

    fn categories(&self) -> Result<Vec<String>, CustomItemError> {
        Ok(non_empty_categories(&self.load()?))
    }
}

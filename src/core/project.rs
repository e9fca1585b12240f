//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::custom_items::FileItemStore;
use crate::core::entity::Entity;
use crate::core::identity::PartId;
use crate::entities::Part;

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".scanmaster";

/// Directory holding part records, relative to the project root
pub const PARTS_DIR: &str = "parts";

/// Represents a ScanMaster project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .scanmaster/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "project found");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create_structure(root)
    }

    /// Initialize even if .scanmaster/ exists; config and custom items are reset
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        let io = |e: std::io::Error| ProjectError::IoError(e.to_string());

        std::fs::create_dir_all(project.scanmaster_dir()).map_err(io)?;
        std::fs::create_dir_all(project.parts_dir()).map_err(io)?;
        std::fs::write(project.config_path(), Self::default_config()).map_err(io)?;
        std::fs::write(project.custom_items_path(), Self::default_custom_items()).map_err(io)?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# ScanMaster Project Configuration

# Default author for new parts (can be overridden by global config)
# author: ""

# Editor to use for `scanmaster part edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, json, tsv, id)
# default_format: auto

# Classifier ratio limits
# thresholds:
#   ring_tube_ratio: 5.0      # L/T, ASTM E2375-16
#   disk_cylinder_ratio: 0.5  # H/D
#   plate_ratio: 5.0          # W/T, ASTM E2375-16
#   bar_ratio: 4.0            # L/W
"#
    }

    fn default_custom_items() -> &'static str {
        "# User-defined list entries, keyed by category\n{}\n"
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .scanmaster configuration directory
    pub fn scanmaster_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.scanmaster_dir().join("config.yaml")
    }

    pub fn custom_items_path(&self) -> PathBuf {
        self.scanmaster_dir().join("custom_items.yaml")
    }

    /// Custom item store backed by this project's file
    pub fn custom_items(&self) -> FileItemStore {
        FileItemStore::new(self.custom_items_path())
    }

    pub fn parts_dir(&self) -> PathBuf {
        self.root.join(PARTS_DIR)
    }

    /// Get the path for a part file
    pub fn part_path(&self, id: &PartId) -> PathBuf {
        self.parts_dir().join(format!("{}{}", id, Part::FILE_SUFFIX))
    }

    /// Iterate all part files, sorted by file name
    pub fn iter_part_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.parts_dir())
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(Part::FILE_SUFFIX))
            .map(|e| e.path().to_path_buf())
    }

    /// Find a part file by full ID or a unique ID prefix (case-insensitive)
    pub fn find_part_file(&self, query: &str) -> Result<PathBuf, ProjectError> {
        let needle = query.trim().to_uppercase();
        if needle.is_empty() {
            return Err(ProjectError::PartNotFound(query.to_string()));
        }

        let mut matches: Vec<PathBuf> = self
            .iter_part_files()
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().to_uppercase().starts_with(&needle))
                    .unwrap_or(false)
            })
            .collect();

        match matches.len() {
            0 => Err(ProjectError::PartNotFound(query.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(ProjectError::AmbiguousPart {
                query: query.to_string(),
                count: n,
            }),
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(
        "not a ScanMaster project (searched from {searched_from:?}). Run 'scanmaster init' to create one."
    )]
    NotFound { searched_from: PathBuf },

    #[error("ScanMaster project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("no part matches '{0}'")]
    PartNotFound(String),

    #[error("'{query}' matches {count} parts; use more of the ID")]
    AmbiguousPart { query: String, count: usize },

    #[error("IO error: {0}")]
    IoError(String),
}

//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::classify::{Classifier, ThresholdOverrides};
use crate::core::Project;

/// ScanMaster configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new parts
    pub author: Option<String>,

    /// Editor command for `scanmaster part edit`
    pub editor: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Classifier ratio limits; each key overrides the layer below
    pub thresholds: ThresholdOverrides,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Same as [`Config::load`] with an already discovered project
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/scanmaster/config.yaml)
        if let Some(global) = Self::global_config_path().and_then(|p| Self::read_file(&p)) {
            config.merge(global);
        }

        // Project config (.scanmaster/config.yaml)
        if let Some(project) = project {
            if let Some(local) = Self::read_file(&project.config_path()) {
                config.merge(local);
            }
        }

        if let Ok(author) = std::env::var("SCANMASTER_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(editor) = std::env::var("SCANMASTER_EDITOR") {
            config.editor = Some(editor);
        }

        config
    }

    /// Read one config file; unreadable or malformed files are skipped
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config");
                return None;
            }
        };
        let blank = contents
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
        if blank {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(mut parsed) => {
                for (key, value) in parsed.thresholds.retain_valid() {
                    tracing::warn!(
                        path = %path.display(),
                        key,
                        value,
                        "ignoring threshold; ratios must be finite and positive"
                    );
                }
                Some(parsed)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                None
            }
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scanmaster")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.thresholds.merge(other.thresholds);
    }

    /// Classifier built from the configured thresholds
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.thresholds.resolve())
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Run the editor on a file; the command may carry its own arguments
    /// (e.g. "code --wait")
    pub fn run_editor(&self, file_path: &Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();
        let cmd = parts.next().unwrap_or("vi");

        std::process::Command::new(cmd)
            .args(parts)
            .arg(file_path)
            .status()
    }
}

//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dimensions::{DimensionField, DimensionSet};
use crate::core::project::Project;
use crate::core::Config;

/// Open the project named by `--project`, or discover it from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))
}

/// `--format`, falling back to the configured default when left on auto
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| <OutputFormat as clap::ValueEnum>::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// A dimension for display; unknown values show as "-"
pub fn format_dim(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "-".to_string(),
    }
}

/// Compact "diameter=120 length=30" summary of the known dimensions
pub fn dims_summary(dims: &DimensionSet) -> String {
    let parts: Vec<String> = DimensionField::all()
        .iter()
        .filter_map(|f| dims.get(*f).map(|v| format!("{}={}", f, v)))
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Ø120 ring forging", 6), "Ø12...");
    }

    #[test]
    fn test_dims_summary() {
        let dims = DimensionSet {
            diameter: Some(120.0),
            length: Some(30.5),
            ..Default::default()
        };
        assert_eq!(dims_summary(&dims), "diameter=120 length=30.5");
        assert_eq!(dims_summary(&DimensionSet::default()), "-");
    }

    #[test]
    fn test_effective_format_uses_config_default() {
        let global = GlobalOpts {
            format: OutputFormat::Auto,
            quiet: false,
            verbose: false,
            project: None,
        };
        let config = Config {
            default_format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(effective_format(&global, &config), OutputFormat::Json);

        let explicit = GlobalOpts {
            format: OutputFormat::Yaml,
            ..global
        };
        assert_eq!(effective_format(&explicit, &config), OutputFormat::Yaml);
    }
}

//! YAML error diagnostics pointing at the offending line

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::core::geometry::PartGeometry;

/// YAML syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(scanmaster::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error and the text it was parsing
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from((offset, usize::from(offset < source.len()))),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("cannot serialize record: {0}")]
    #[diagnostic(code(scanmaster::yaml::serialize))]
    Serialize(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(scanmaster::io))]
    Io(#[from] std::io::Error),
}

/// Byte offset of a 1-based line/column pair, clamped to the source length
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let line_text = source[line_start..].lines().next().unwrap_or("");
    let col = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());
    (line_start + col).min(source.len())
}

/// Suggest a fix for common mistakes
fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("unknown variant") && msg.contains("ring") {
        let tags: Vec<&str> = PartGeometry::all().iter().map(|g| g.as_str()).collect();
        return Some(format!("Valid geometry tags: {}", tags.join(", ")));
    }

    if msg.contains("missing field") {
        return Some("Add the missing field, or recreate the part with `scanmaster part new`".to_string());
    }

    if msg.contains("tab") {
        return Some("YAML indentation must use spaces, not tabs".to_string());
    }

    if msg.contains("duplicate") {
        return Some("Each key can only appear once".to_string());
    }

    if msg.contains("invalid type") && msg.contains("f64") {
        return Some("Dimensions are plain numbers in mm, e.g. `diameter: 120.5`".to_string());
    }

    if msg.contains("mapping values are not allowed") || msg.contains("expected block end") {
        return Some("Check indentation and the space after each ':'".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 9), source.len());
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("geometry: unknown variant `donut`, expected one of `ring`, ...")
            .unwrap()
            .contains("ring_forging"));
        assert!(generate_help("missing field `title`").is_some());
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_error_from_serde() {
        let source = "title: ok\ngeometry: donut\n";
        let err = serde_yml::from_str::<crate::entities::Part>(source).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, source, "part.sm.yaml");
        assert!(!diag.message().is_empty());
    }
}

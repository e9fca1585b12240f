//! Schema validation with source-located error reporting

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::schema::registry::{SchemaRegistry, PART_SCHEMA};

/// Validation failure for one file, with every violation found
#[derive(Debug, Error, Diagnostic)]
#[error("{filename}: {summary}")]
#[diagnostic(code(scanmaster::schema::validation))]
pub struct ValidationError {
    filename: String,
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{hint}")]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(
        message: impl Into<String>,
        hint: impl Into<String>,
        span: SourceSpan,
        help: Option<String>,
    ) -> Self {
        Self {
            span,
            message: message.into(),
            hint: hint.into(),
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let summary = match violations.len() {
            1 => "1 error".to_string(),
            n => format!("{} errors", n),
        };
        Self {
            filename: filename.to_string(),
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Compiled part schema
pub struct Validator {
    part: Option<JsonValidator>,
}

impl Validator {
    pub fn new(registry: &SchemaRegistry) -> Self {
        let part = registry
            .get(PART_SCHEMA)
            .and_then(|s| serde_json::from_str::<JsonValue>(s).ok())
            .and_then(|schema| match validator_for(&schema) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(error = %e, "part schema does not compile");
                    None
                }
            });
        Self { part }
    }

    /// Check a part file's YAML text, collecting every violation
    pub fn validate_part(&self, content: &str, filename: &str) -> Result<(), ValidationError> {
        let yaml_value: serde_yml::Value = serde_yml::from_str(content).map_err(|e| {
            let violation = SchemaViolation::new(
                format!("YAML parse error: {}", e),
                "invalid YAML",
                find_error_span(content, e.location()),
                Some("Check indentation, colons and quoting".to_string()),
            );
            ValidationError::new(filename, content, vec![violation])
        })?;

        let json_value: JsonValue = serde_json::to_value(&yaml_value).map_err(|e| {
            let violation = SchemaViolation::new(
                format!("cannot convert YAML to JSON: {}", e),
                "conversion error",
                (0, content.len()).into(),
                None,
            );
            ValidationError::new(filename, content, vec![violation])
        })?;

        let Some(schema) = &self.part else {
            return Ok(());
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&SchemaRegistry::default())
    }
}

fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    SchemaViolation::new(
        format_schema_error(error),
        format_error_hint(error),
        find_path_span(content, &path),
        generate_help_message(error),
    )
}

fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            format!("missing required field {} at {}", value_text(property), path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::Enum { options } => {
            format!("invalid value at {}: must be one of {}", path, enum_options(options))
        }
        ValidationErrorKind::Pattern { pattern } => {
            format!("value at {} does not match {}", path, pattern)
        }
        ValidationErrorKind::Minimum { limit } => {
            format!("value at {} is below the minimum {}", path, limit)
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("value at {} is shorter than {} characters", path, limit)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("validation error at {}: {}", path, error),
    }
}

fn value_text(value: &JsonValue) -> String {
    value
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn enum_options(options: &JsonValue) -> String {
    match options.as_array() {
        Some(arr) => arr.iter().map(value_text).collect::<Vec<_>>().join(", "),
        None => options.to_string(),
    }
}

fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing",
        ValidationErrorKind::Type { .. } => "wrong type",
        ValidationErrorKind::Enum { .. } => "invalid value",
        ValidationErrorKind::Pattern { .. } => "pattern mismatch",
        ValidationErrorKind::Minimum { .. } => "too small",
        ValidationErrorKind::MinLength { .. } => "too short",
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field",
        _ => "validation error",
    }
    .to_string()
}

fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            Some(format!("Add the '{}' field to the file", value_text(property)))
        }
        ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", enum_options(options)))
        }
        ValidationErrorKind::Pattern { pattern } if pattern.contains("PART-") => Some(
            "ID format: PART-[26 ULID characters], e.g. PART-01HC2JB7SMQX7RS1Y0GFKBHPTD"
                .to_string(),
        ),
        ValidationErrorKind::Minimum { .. } => {
            Some("Dimensions are measured sizes in mm and cannot be negative".to_string())
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => match unexpected.as_slice() {
            [one] => Some(format!("Remove the '{}' field or check spelling", one)),
            _ => Some("Remove unknown fields or check spelling".to_string()),
        },
        _ => None,
    }
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len.min(content.len())).into()
}

/// Span of a serde_yml error location
fn find_error_span(content: &str, location: Option<serde_yml::Location>) -> SourceSpan {
    let Some(loc) = location else {
        return first_line_span(content);
    };
    let line = loc.line().saturating_sub(1);
    let column = loc.column().saturating_sub(1);

    let line_start: usize = content
        .split_inclusive('\n')
        .take(line)
        .map(str::len)
        .sum();
    let offset = (line_start + column).min(content.len());
    let rest = &content[offset..];
    let len = rest.find('\n').unwrap_or(rest.len());
    (offset, len).into()
}

/// Span for a JSON pointer such as `/dimensions/diameter`
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    // Array indices point at the parent key
    let key = parts
        .iter()
        .rev()
        .find(|p| p.parse::<usize>().is_err())
        .copied();

    key.and_then(|k| find_key_span(content, k))
        .unwrap_or_else(|| first_line_span(content))
}

/// Span of the first line that starts with `key:`
pub fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let pattern = format!("{}:", key);
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(&pattern) {
            let start = offset + (line.len() - trimmed.len());
            return Some((start, trimmed.trim_end().len()).into());
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
id: PART-01HC2JB7SMQX7RS1Y0GFKBHPTD
title: "Bearing ring"
geometry: ring
dimensions:
  diameter: 120.0
  inner_diameter: 100.0
  length: 30.0
  wall_thickness: 10.0
status: draft
created: 2024-01-01T00:00:00Z
author: Test
entity_revision: 1
"#;

    #[test]
    fn test_validator_compiles_part_schema() {
        let validator = Validator::default();
        assert!(validator.part.is_some());
    }

    #[test]
    fn test_valid_part() {
        let validator = Validator::default();
        let result = validator.validate_part(VALID, "test.sm.yaml");
        assert!(result.is_ok(), "valid part should pass: {:?}", result);
    }

    #[test]
    fn test_missing_required_fields() {
        let validator = Validator::default();
        let yaml = "id: PART-01HC2JB7SMQX7RS1Y0GFKBHPTD\ngeometry: ring\n";
        let err = validator.validate_part(yaml, "test.sm.yaml").unwrap_err();
        // title, created, author
        assert_eq!(err.violation_count(), 3);
    }

    #[test]
    fn test_invalid_geometry_tag() {
        let validator = Validator::default();
        let yaml = VALID.replace("geometry: ring", "geometry: donut");
        let err = validator.validate_part(&yaml, "test.sm.yaml").unwrap_err();
        assert!(err.violations().iter().any(|v| v.message().contains("geometry")));
    }

    #[test]
    fn test_negative_dimension() {
        let validator = Validator::default();
        let yaml = VALID.replace("length: 30.0", "length: -30.0");
        let err = validator.validate_part(&yaml, "test.sm.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 1);
    }

    #[test]
    fn test_unknown_dimension_field() {
        let validator = Validator::default();
        let yaml = VALID.replace("length: 30.0", "lenght: 30.0");
        let err = validator.validate_part(&yaml, "test.sm.yaml").unwrap_err();
        assert!(err.violations()[0].message().contains("lenght"));
    }

    #[test]
    fn test_yaml_syntax_error() {
        let validator = Validator::default();
        let err = validator
            .validate_part("title: [unclosed\n", "test.sm.yaml")
            .unwrap_err();
        assert!(err.violations()[0].message().starts_with("YAML parse error"));
    }

    #[test]
    fn test_find_key_span() {
        let content = "title: x\ndimensions:\n  diameter: 5\n";
        let span = find_key_span(content, "diameter").unwrap();
        assert_eq!(span.offset(), 23);
        assert_eq!(span.len(), "diameter: 5".len());
    }
}

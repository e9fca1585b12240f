//! Template generation for new part files

use chrono::SecondsFormat;
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::dimensions::DimensionField;
use crate::entities::Part;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const PART_TEMPLATE: &str = "part.yaml.tera";

/// Template generator using Tera
pub struct TemplateGenerator {
    tera: Tera,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

#[derive(Serialize)]
struct DimensionEntry {
    name: &'static str,
    value: f64,
}

impl TemplateGenerator {
    /// Create a new template generator with embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let name = file.as_ref();
            let Some(content) = EmbeddedTemplates::get(name) else {
                continue;
            };
            let text = std::str::from_utf8(&content.data)
                .map_err(|_| TemplateError::NotFound(name.to_string()))?;
            tera.add_raw_template(name, text)
                .map_err(|e| TemplateError::RenderError(e.to_string()))?;
        }

        Ok(Self { tera })
    }

    /// Render a part file with explanatory comments
    pub fn generate_part(&self, part: &Part) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == PART_TEMPLATE) {
            return self.hardcoded_part_template(part);
        }

        let dimensions: Vec<DimensionEntry> = DimensionField::all()
            .iter()
            .filter_map(|f| {
                part.dimensions.get(*f).map(|value| DimensionEntry {
                    name: f.as_str(),
                    value,
                })
            })
            .collect();

        let mut context = tera::Context::new();
        context.insert("id", &part.id.to_string());
        context.insert("title", &part.title);
        context.insert("part_number", &part.part_number);
        context.insert("material", &part.material);
        context.insert("geometry", part.geometry.as_str());
        context.insert("dimensions", &dimensions);
        context.insert("tags", &part.tags);
        context.insert("status", part.status.as_str());
        context.insert(
            "created",
            &part.created.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        context.insert("author", &part.author);
        context.insert("entity_revision", &part.entity_revision);

        self.tera
            .render(PART_TEMPLATE, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    fn hardcoded_part_template(&self, part: &Part) -> Result<String, TemplateError> {
        let body =
            serde_yml::to_string(part).map_err(|e| TemplateError::RenderError(e.to_string()))?;
        Ok(format!("# ScanMaster part record\n\n{}", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::PartGeometry;

    fn sample_part() -> Part {
        let mut part = Part::new("Bearing \"A\" ring", PartGeometry::Ring, "test");
        part.material = Some("52100: through-hardened".to_string());
        part.tags = vec!["forged".to_string(), "lot 7".to_string()];
        part.dimensions.diameter = Some(120.0);
        part.dimensions.inner_diameter = Some(100.5);
        part.dimensions.length = Some(30.0);
        part.dimensions = part.dimensions.with_derived_wall_thickness();
        part
    }

    #[test]
    fn test_rendered_part_parses_back() {
        let generator = TemplateGenerator::new().unwrap();
        let part = sample_part();

        let yaml = generator.generate_part(&part).unwrap();
        assert!(yaml.starts_with("# ScanMaster part record"));

        let parsed: Part = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, part.id);
        assert_eq!(parsed.title, part.title);
        assert_eq!(parsed.material, part.material);
        assert_eq!(parsed.geometry, PartGeometry::Ring);
        assert_eq!(parsed.dimensions, part.dimensions);
        assert_eq!(parsed.tags, part.tags);
        assert_eq!(parsed.created.timestamp(), part.created.timestamp());
    }

    #[test]
    fn test_rendered_part_without_dimensions() {
        let generator = TemplateGenerator::new().unwrap();
        let part = Part::new("Blank", PartGeometry::Custom, "test");

        let yaml = generator.generate_part(&part).unwrap();
        assert!(yaml.contains("dimensions: {}"));
        let parsed: Part = serde_yml::from_str(&yaml).unwrap();
        assert!(parsed.dimensions.is_empty());
        assert!(parsed.part_number.is_none());
    }

    #[test]
    fn test_fallback_parses_back() {
        let generator = TemplateGenerator { tera: Tera::default() };
        let part = sample_part();
        let yaml = generator.generate_part(&part).unwrap();
        let parsed: Part = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, part.id);
    }
}

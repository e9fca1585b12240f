//! Interactive wizard for part creation
//!
//! Prompt labels come from the part schema's field descriptions; the
//! material list comes from the project's custom items.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::core::custom_items::CustomItemStore;
use crate::core::dimensions::{DimensionField, DimensionSet};
use crate::core::geometry::{PartGeometry, ShapeFamily};
use crate::schema::registry::{SchemaRegistry, PART_SCHEMA};

/// Custom item category offered for the material prompt
pub const MATERIAL_CATEGORY: &str = "material";

/// A wizard for creating parts
pub struct PartWizard {
    schema: Value,
    theme: ColorfulTheme,
}

/// Values collected by the wizard
#[derive(Debug, Clone)]
pub struct WizardResult {
    pub title: String,
    pub geometry: PartGeometry,
    pub part_number: Option<String>,
    pub material: Option<String>,
    pub dimensions: DimensionSet,
}

impl PartWizard {
    pub fn new() -> Self {
        let registry = SchemaRegistry::default();
        let schema = registry
            .get(PART_SCHEMA)
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(Value::Null);
        Self {
            schema,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run the prompts; `title` and `geometry` pre-fill the first two answers
    pub fn run(
        &self,
        title: Option<&str>,
        geometry: Option<PartGeometry>,
        store: &mut dyn CustomItemStore,
    ) -> Result<WizardResult> {
        println!();
        println!("{} Creating new {}", style("◆").cyan(), style("part").bold());
        println!("{}", style("─".repeat(50)).dim());
        println!();

        let mut title_input = Input::<String>::with_theme(&self.theme)
            .with_prompt(self.prompt_for(&["title"], "Title"));
        if let Some(t) = title {
            title_input = title_input.default(t.to_string());
        }
        let title = title_input.interact_text().into_diagnostic()?;

        let tags: Vec<&str> = PartGeometry::all().iter().map(|g| g.as_str()).collect();
        let default_idx = geometry
            .and_then(|g| PartGeometry::all().iter().position(|x| *x == g))
            .unwrap_or(0);
        let selection = Select::with_theme(&self.theme)
            .with_prompt(self.prompt_for(&["geometry"], "Geometry"))
            .items(&tags)
            .default(default_idx)
            .interact()
            .into_diagnostic()?;
        let geometry = PartGeometry::all()[selection];

        let part_number = self.optional_text(&["part_number"], "Part Number")?;
        let material = self.prompt_material(store)?;

        let mut dimensions = DimensionSet::default();
        for field in fields_for(geometry) {
            let label = field.as_str().replace('_', " ");
            let prompt = self.prompt_for(&["dimensions", field.as_str()], &label);
            let raw: String = Input::with_theme(&self.theme)
                .with_prompt(prompt)
                .allow_empty(true)
                .validate_with(|input: &String| parse_dimension(input).map(|_| ()))
                .interact_text()
                .into_diagnostic()?;
            dimensions.set(*field, parse_dimension(&raw).map_err(|e| miette::miette!(e))?);
        }

        println!();
        println!("{} Values collected", style("✓").green());

        Ok(WizardResult {
            title,
            geometry,
            part_number,
            material,
            dimensions,
        })
    }

    fn prompt_material(&self, store: &mut dyn CustomItemStore) -> Result<Option<String>> {
        let known = store.get(MATERIAL_CATEGORY).into_diagnostic()?;
        let mut items: Vec<String> = vec!["(none)".to_string()];
        items.extend(known.iter().cloned());
        items.push("Other...".to_string());

        let selection = Select::with_theme(&self.theme)
            .with_prompt(self.prompt_for(&["material"], "Material"))
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;

        if selection == 0 {
            return Ok(None);
        }
        if selection <= known.len() {
            return Ok(Some(known[selection - 1].clone()));
        }

        let value: String = Input::with_theme(&self.theme)
            .with_prompt("New material")
            .interact_text()
            .into_diagnostic()?;
        if store.add(MATERIAL_CATEGORY, &value).into_diagnostic()? {
            println!(
                "{} Added '{}' to custom {} list",
                style("→").dim(),
                value.trim(),
                MATERIAL_CATEGORY
            );
        }
        Ok(Some(value.trim().to_string()))
    }

    fn optional_text(&self, path: &[&str], label: &str) -> Result<Option<String>> {
        let value: String = Input::with_theme(&self.theme)
            .with_prompt(self.prompt_for(path, label))
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    /// Label plus the schema description of the field, if any
    fn prompt_for(&self, path: &[&str], label: &str) -> String {
        match field_description(&self.schema, path) {
            Some(desc) => format!("{} ({})", title_case(label), style(desc).dim()),
            None => title_case(label),
        }
    }
}

impl Default for PartWizard {
    fn default() -> Self {
        Self::new()
    }
}

/// Dimensions worth asking for a given geometry
fn fields_for(geometry: PartGeometry) -> &'static [DimensionField] {
    match geometry.family() {
        ShapeFamily::Circular => &[
            DimensionField::Diameter,
            DimensionField::InnerDiameter,
            DimensionField::Length,
        ],
        ShapeFamily::Rectangular => &[
            DimensionField::Length,
            DimensionField::Width,
            DimensionField::Thickness,
        ],
        ShapeFamily::Other => &[
            DimensionField::Diameter,
            DimensionField::Length,
            DimensionField::Width,
            DimensionField::Thickness,
        ],
    }
}

/// Empty input means "unknown"
fn parse_dimension(input: &str) -> std::result::Result<Option<f64>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(format!("'{}' is not a non-negative number", input)),
    }
}

/// Walk `properties` down the given path and read its description
fn field_description<'a>(schema: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut node = schema;
    for key in path {
        node = node.get("properties")?.get(*key)?;
    }
    node.get("description").and_then(Value::as_str)
}

fn title_case(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_descriptions_are_found() {
        let wizard = PartWizard::new();
        assert_eq!(
            field_description(&wizard.schema, &["dimensions", "diameter"]),
            Some("Outer diameter (mm)")
        );
        assert!(field_description(&wizard.schema, &["nope"]).is_none());
    }

    #[test]
    fn test_fields_for_family() {
        assert!(fields_for(PartGeometry::Tube).contains(&DimensionField::InnerDiameter));
        assert!(fields_for(PartGeometry::Plate).contains(&DimensionField::Thickness));
        assert!(!fields_for(PartGeometry::Plate).contains(&DimensionField::Diameter));
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension(""), Ok(None));
        assert_eq!(parse_dimension(" 12.5 "), Ok(Some(12.5)));
        assert!(parse_dimension("-1").is_err());
        assert!(parse_dimension("abc").is_err());
        assert!(parse_dimension("inf").is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("inner diameter"), "Inner Diameter");
        assert_eq!(title_case("part_number"), "Part Number");
    }
}

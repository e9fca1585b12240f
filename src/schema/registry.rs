//! Embedded JSON schemas

use rust_embed::Embed;
use std::collections::BTreeMap;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Name of the schema describing part records
pub const PART_SCHEMA: &str = "part";

/// Schema sources keyed by name (`part` for `part.schema.json`)
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, String>,
}

impl SchemaRegistry {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.schemas.get(name).map(String::as_str)
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let schemas = EmbeddedSchemas::iter()
            .filter_map(|file| {
                let name = file.strip_suffix(".schema.json")?.to_string();
                let content = EmbeddedSchemas::get(&file)?;
                let text = std::str::from_utf8(&content.data).ok()?.to_string();
                Some((name, text))
            })
            .collect();
        Self { schemas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_schema_is_embedded() {
        let registry = SchemaRegistry::default();
        assert!(registry.has_schema(PART_SCHEMA));
        let schema: serde_json::Value =
            serde_json::from_str(registry.get(PART_SCHEMA).unwrap()).unwrap();
        assert_eq!(schema["title"], "Part");
    }

    #[test]
    fn test_schema_geometry_enum_matches_tags() {
        let registry = SchemaRegistry::default();
        let schema: serde_json::Value =
            serde_json::from_str(registry.get(PART_SCHEMA).unwrap()).unwrap();
        let tags: Vec<&str> = schema["properties"]["geometry"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        let expected: Vec<&str> = crate::core::PartGeometry::all()
            .iter()
            .map(|g| g.as_str())
            .collect();
        assert_eq!(tags, expected);
    }
}

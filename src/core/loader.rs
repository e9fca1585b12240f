//! Record loading and saving
//!
//! Parse failures carry the file source so miette can point at the bad line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::entity::Entity;
use crate::yaml::{YamlError, YamlSyntaxError};

/// Load one record from a YAML file
pub fn load_entity<T: Entity + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = fs::read_to_string(path)?;
    let filename = path.display().to_string();
    serde_yml::from_str(&content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, &content, &filename).into())
}

/// Load every record from the given files
///
/// Files that fail to parse are logged and skipped; `validate` reports them.
pub fn load_all<T: Entity + 'static>(paths: impl IntoIterator<Item = PathBuf>) -> Vec<(PathBuf, T)> {
    paths
        .into_iter()
        .filter_map(|path| match load_entity::<T>(&path) {
            Ok(entity) => Some((path, entity)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record");
                None
            }
        })
        .collect()
}

/// Write a record back to its file
pub fn save_entity<T: Entity>(path: &Path, entity: &T) -> Result<(), YamlError> {
    let yaml = serde_yml::to_string(entity).map_err(|e| YamlError::Serialize(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, yaml)?;
    tracing::debug!(path = %path.display(), id = %entity.id_string(), "record saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::PartGeometry;
    use crate::entities::Part;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let part = Part::new("Disk blank", PartGeometry::Disk, "test");
        let path = tmp.path().join(format!("{}.sm.yaml", part.id));

        save_entity(&path, &part).unwrap();
        let loaded: Part = load_entity(&path).unwrap();
        assert_eq!(loaded.id, part.id);
        assert_eq!(loaded.geometry, PartGeometry::Disk);
    }

    #[test]
    fn test_load_reports_syntax_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.sm.yaml");
        fs::write(&path, "id: PART-01HQ3K4N5M6P7R8S9T0UVWXYZ\ntitle: [oops\n").unwrap();

        let err = load_entity::<Part>(&path).unwrap_err();
        assert!(matches!(err, YamlError::Syntax(_)));
    }

    #[test]
    fn test_load_all_skips_bad_files() {
        let tmp = tempdir().unwrap();
        let good = Part::new("Good", PartGeometry::Plate, "test");
        let good_path = tmp.path().join("good.sm.yaml");
        save_entity(&good_path, &good).unwrap();
        let bad_path = tmp.path().join("bad.sm.yaml");
        fs::write(&bad_path, "not: [a part").unwrap();

        let loaded: Vec<(PathBuf, Part)> = load_all(vec![good_path.clone(), bad_path]);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, good_path);
    }
}

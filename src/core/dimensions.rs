//! Part dimensions and derived values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing a stored wall thickness with the derived one
const WALL_TOLERANCE: f64 = 1e-6;

/// Measured part dimensions in millimetres
///
/// Every field is optional while the part is being described. `wall_thickness`
/// is derived from the two diameters whenever both are known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionSet {
    /// Outer diameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,

    /// Inner diameter (hollow parts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_diameter: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,

    /// Wall thickness, (OD - ID) / 2 when both diameters are known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_thickness: Option<f64>,
}

/// Name of a single dimension field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionField {
    Diameter,
    InnerDiameter,
    Length,
    Width,
    Thickness,
    WallThickness,
}

impl DimensionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionField::Diameter => "diameter",
            DimensionField::InnerDiameter => "inner_diameter",
            DimensionField::Length => "length",
            DimensionField::Width => "width",
            DimensionField::Thickness => "thickness",
            DimensionField::WallThickness => "wall_thickness",
        }
    }

    pub fn all() -> &'static [DimensionField] {
        &[
            DimensionField::Diameter,
            DimensionField::InnerDiameter,
            DimensionField::Length,
            DimensionField::Width,
            DimensionField::Thickness,
            DimensionField::WallThickness,
        ]
    }

    /// Whether changing this field can change the derived wall thickness
    pub fn is_diameter(&self) -> bool {
        matches!(self, DimensionField::Diameter | DimensionField::InnerDiameter)
    }
}

impl fmt::Display for DimensionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DimensionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "diameter" | "od" => Ok(DimensionField::Diameter),
            "inner_diameter" | "id" => Ok(DimensionField::InnerDiameter),
            "length" => Ok(DimensionField::Length),
            "width" => Ok(DimensionField::Width),
            "thickness" => Ok(DimensionField::Thickness),
            "wall_thickness" | "wall" => Ok(DimensionField::WallThickness),
            _ => Err(format!("Unknown dimension: {}", s)),
        }
    }
}

impl DimensionSet {
    pub fn get(&self, field: DimensionField) -> Option<f64> {
        match field {
            DimensionField::Diameter => self.diameter,
            DimensionField::InnerDiameter => self.inner_diameter,
            DimensionField::Length => self.length,
            DimensionField::Width => self.width,
            DimensionField::Thickness => self.thickness,
            DimensionField::WallThickness => self.wall_thickness,
        }
    }

    pub fn set(&mut self, field: DimensionField, value: Option<f64>) {
        let slot = match field {
            DimensionField::Diameter => &mut self.diameter,
            DimensionField::InnerDiameter => &mut self.inner_diameter,
            DimensionField::Length => &mut self.length,
            DimensionField::Width => &mut self.width,
            DimensionField::Thickness => &mut self.thickness,
            DimensionField::WallThickness => &mut self.wall_thickness,
        };
        *slot = value;
    }

    /// Height used by the circular classifier: length, else thickness
    pub fn height(&self) -> Option<f64> {
        self.length.or(self.thickness)
    }

    /// (OD - ID) / 2, when both diameters are known
    pub fn derived_wall_thickness(&self) -> Option<f64> {
        match (self.diameter, self.inner_diameter) {
            (Some(od), Some(id)) => Some((od - id) / 2.0),
            _ => None,
        }
    }

    /// Whether the wall thickness is pinned by the two diameters
    pub fn wall_thickness_is_derived(&self) -> bool {
        self.diameter.is_some() && self.inner_diameter.is_some()
    }

    /// Inner diameter is present and positive
    pub fn is_hollow(&self) -> bool {
        self.inner_diameter.is_some_and(|id| id > 0.0)
    }

    /// Copy with the wall thickness recomputed from the diameters
    ///
    /// Keeps the stored wall thickness when a diameter is missing.
    pub fn with_derived_wall_thickness(mut self) -> Self {
        if let Some(wall) = self.derived_wall_thickness() {
            self.wall_thickness = Some(wall);
        }
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        DimensionField::all().iter().all(|f| self.get(*f).is_none())
    }

    /// Consistency checks; problems are reported, never raised
    pub fn check(&self) -> Vec<DimensionIssue> {
        let mut issues = Vec::new();

        for field in DimensionField::all() {
            if let Some(value) = self.get(*field) {
                if !value.is_finite() {
                    issues.push(DimensionIssue::NotFinite { field: *field });
                } else if value < 0.0 {
                    issues.push(DimensionIssue::Negative {
                        field: *field,
                        value,
                    });
                }
            }
        }

        if let (Some(od), Some(id)) = (self.diameter, self.inner_diameter) {
            if id > 0.0 && id >= od {
                issues.push(DimensionIssue::InnerNotSmaller {
                    inner: id,
                    outer: od,
                });
            }
        }

        if let (Some(stored), Some(derived)) =
            (self.wall_thickness, self.derived_wall_thickness())
        {
            if (stored - derived).abs() > WALL_TOLERANCE {
                issues.push(DimensionIssue::WallMismatch { stored, derived });
            }
        }

        issues
    }
}

/// A consistency problem found in a dimension set
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionIssue {
    Negative { field: DimensionField, value: f64 },
    NotFinite { field: DimensionField },
    InnerNotSmaller { inner: f64, outer: f64 },
    WallMismatch { stored: f64, derived: f64 },
}

impl fmt::Display for DimensionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionIssue::Negative { field, value } => {
                write!(f, "{} is negative ({})", field, value)
            }
            DimensionIssue::NotFinite { field } => write!(f, "{} is not a finite number", field),
            DimensionIssue::InnerNotSmaller { inner, outer } => write!(
                f,
                "inner_diameter ({}) must be smaller than diameter ({})",
                inner, outer
            ),
            DimensionIssue::WallMismatch { stored, derived } => write!(
                f,
                "wall_thickness ({}) does not match (diameter - inner_diameter) / 2 = {}",
                stored, derived
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hollow(od: f64, id: f64) -> DimensionSet {
        DimensionSet {
            diameter: Some(od),
            inner_diameter: Some(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_derived_wall_thickness() {
        assert_eq!(hollow(100.0, 80.0).derived_wall_thickness(), Some(10.0));
        assert_eq!(DimensionSet::default().derived_wall_thickness(), None);
    }

    #[test]
    fn test_height_prefers_length() {
        let dims = DimensionSet {
            length: Some(40.0),
            thickness: Some(12.0),
            ..Default::default()
        };
        assert_eq!(dims.height(), Some(40.0));

        let dims = DimensionSet {
            thickness: Some(12.0),
            ..Default::default()
        };
        assert_eq!(dims.height(), Some(12.0));
    }

    #[test]
    fn test_with_derived_wall_overrides_stale_value() {
        let mut dims = hollow(100.0, 80.0);
        dims.wall_thickness = Some(3.0);
        assert_eq!(dims.with_derived_wall_thickness().wall_thickness, Some(10.0));
    }

    #[test]
    fn test_with_derived_wall_keeps_manual_value_without_both_diameters() {
        let dims = DimensionSet {
            diameter: Some(100.0),
            wall_thickness: Some(7.5),
            ..Default::default()
        };
        assert_eq!(dims.with_derived_wall_thickness().wall_thickness, Some(7.5));
    }

    #[test]
    fn test_check_flags_inner_not_smaller() {
        let issues = hollow(80.0, 80.0).check();
        assert!(issues
            .iter()
            .any(|i| matches!(i, DimensionIssue::InnerNotSmaller { .. })));
    }

    #[test]
    fn test_check_flags_negative_and_mismatch() {
        let mut dims = hollow(100.0, 80.0);
        dims.wall_thickness = Some(12.0);
        dims.length = Some(-1.0);
        let issues = dims.check();
        assert!(issues.contains(&DimensionIssue::WallMismatch {
            stored: 12.0,
            derived: 10.0
        }));
        assert!(issues.contains(&DimensionIssue::Negative {
            field: DimensionField::Length,
            value: -1.0
        }));
    }

    #[test]
    fn test_check_clean_set() {
        let dims = hollow(100.0, 80.0).with_derived_wall_thickness();
        assert!(dims.check().is_empty());
    }

    #[test]
    fn test_field_from_str_aliases() {
        assert_eq!("od".parse::<DimensionField>(), Ok(DimensionField::Diameter));
        assert_eq!(
            "inner-diameter".parse::<DimensionField>(),
            Ok(DimensionField::InnerDiameter)
        );
        assert!("depth".parse::<DimensionField>().is_err());
    }

    #[test]
    fn test_yaml_skips_missing_fields() {
        let dims = DimensionSet {
            diameter: Some(50.0),
            ..Default::default()
        };
        let yaml = serde_yml::to_string(&dims).unwrap();
        assert!(yaml.contains("diameter: 50"));
        assert!(!yaml.contains("width"));
    }
}

//! Shape classification - ASTM E2375-16 style geometry rules
//!
//! Given a part's current geometry tag and its measured dimensions, decide
//! whether the tag should be revised:
//!
//! - hollow round parts: ring when L/T < 5, tube otherwise (E2375-16 Fig. 6)
//! - solid round parts: disk when H/D < 0.5, cylinder otherwise
//! - prismatic parts: plate when W/T > 5 (E2375-16 Fig. 7), bar when L/W > 4,
//!   box otherwise
//!
//! Classification never fails. Whenever the guards below do not pass, the
//! current tag comes back unchanged. More specific tags within an outcome
//! (pipe, sleeve, shaft, billet, forgings...) are preserved.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::dimensions::{DimensionField, DimensionSet};
use crate::core::geometry::{PartGeometry, ShapeFamily};

/// Length to wall thickness ratio below which a hollow part is a ring
pub const RING_TUBE_RATIO: f64 = 5.0;

/// Height to diameter ratio below which a solid round part is a disk
pub const DISK_CYLINDER_RATIO: f64 = 0.5;

/// Width to thickness ratio above which a prismatic part is a plate
pub const PLATE_RATIO: f64 = 5.0;

/// Length to width ratio above which a prismatic part is a bar
pub const BAR_RATIO: f64 = 4.0;

/// Ratio thresholds used by the classifier
///
/// The L/T and W/T limits come from ASTM E2375-16. The H/D and L/W limits
/// are shop convention, so projects may override any of them in config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub ring_tube_ratio: f64,
    pub disk_cylinder_ratio: f64,
    pub plate_ratio: f64,
    pub bar_ratio: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            ring_tube_ratio: RING_TUBE_RATIO,
            disk_cylinder_ratio: DISK_CYLINDER_RATIO,
            plate_ratio: PLATE_RATIO,
            bar_ratio: BAR_RATIO,
        }
    }
}

/// A usable ratio limit is finite and strictly positive
pub fn is_valid_ratio(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Threshold keys set by one config layer; unset keys fall through
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdOverrides {
    pub ring_tube_ratio: Option<f64>,
    pub disk_cylinder_ratio: Option<f64>,
    pub plate_ratio: Option<f64>,
    pub bar_ratio: Option<f64>,
}

impl ThresholdOverrides {
    fn fields_mut(&mut self) -> [(&'static str, &mut Option<f64>); 4] {
        [
            ("ring_tube_ratio", &mut self.ring_tube_ratio),
            ("disk_cylinder_ratio", &mut self.disk_cylinder_ratio),
            ("plate_ratio", &mut self.plate_ratio),
            ("bar_ratio", &mut self.bar_ratio),
        ]
    }

    /// Overlay a higher-precedence layer key by key
    pub fn merge(&mut self, other: ThresholdOverrides) {
        self.ring_tube_ratio = other.ring_tube_ratio.or(self.ring_tube_ratio);
        self.disk_cylinder_ratio = other.disk_cylinder_ratio.or(self.disk_cylinder_ratio);
        self.plate_ratio = other.plate_ratio.or(self.plate_ratio);
        self.bar_ratio = other.bar_ratio.or(self.bar_ratio);
    }

    /// Unset every ratio that fails [`is_valid_ratio`]; returns what was dropped
    pub fn retain_valid(&mut self) -> Vec<(&'static str, f64)> {
        let mut rejected = Vec::new();
        for (key, slot) in self.fields_mut() {
            if let Some(value) = *slot {
                if !is_valid_ratio(value) {
                    rejected.push((key, value));
                    *slot = None;
                }
            }
        }
        rejected
    }

    /// Full threshold set, with defaults for the keys no layer set
    pub fn resolve(&self) -> ClassificationThresholds {
        let defaults = ClassificationThresholds::default();
        ClassificationThresholds {
            ring_tube_ratio: self.ring_tube_ratio.unwrap_or(defaults.ring_tube_ratio),
            disk_cylinder_ratio: self
                .disk_cylinder_ratio
                .unwrap_or(defaults.disk_cylinder_ratio),
            plate_ratio: self.plate_ratio.unwrap_or(defaults.plate_ratio),
            bar_ratio: self.bar_ratio.unwrap_or(defaults.bar_ratio),
        }
    }
}

/// Which ratio rule produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Length (height) over wall thickness, ring vs tube
    LengthToWall,
    /// Height over diameter, disk vs cylinder
    HeightToDiameter,
    /// Middle over smallest side, plate
    WidthToThickness,
    /// Largest over middle side, bar vs box
    LengthToWidth,
}

impl Rule {
    pub fn label(&self) -> &'static str {
        match self {
            Rule::LengthToWall => "L/T",
            Rule::HeightToDiameter => "H/D",
            Rule::WidthToThickness => "W/T",
            Rule::LengthToWidth => "L/W",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why the classifier returned what it returned
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The current tag is outside the families the classifier handles
    NotApplicable,
    /// Required dimensions are missing
    InsufficientData { missing: Vec<String> },
    /// An always-hollow tag without a usable inner diameter is left alone
    PreservedHollow,
    /// The computed wall thickness is zero or negative
    DegenerateGeometry { wall_thickness: f64 },
    /// A ratio rule decided the result
    Classified {
        rule: Rule,
        ratio: f64,
        threshold: f64,
        /// The ratio was not finite (a zero or negative denominator)
        degenerate_input: bool,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NotApplicable => write!(f, "not applicable to this geometry"),
            Outcome::InsufficientData { missing } => {
                write!(f, "insufficient data (missing {})", missing.join(", "))
            }
            Outcome::PreservedHollow => {
                write!(f, "hollow geometry kept until an inner diameter is entered")
            }
            Outcome::DegenerateGeometry { wall_thickness } => {
                write!(f, "degenerate geometry (wall thickness {})", wall_thickness)
            }
            Outcome::Classified {
                rule,
                ratio,
                threshold,
                degenerate_input,
            } => {
                write!(f, "{} = {:.3} (threshold {})", rule, ratio, threshold)?;
                if *degenerate_input {
                    write!(f, " [degenerate input]")?;
                }
                Ok(())
            }
        }
    }
}

/// Result of one classification with its reasoning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Tag before classification
    pub from: PartGeometry,
    /// Tag after classification
    pub geometry: PartGeometry,
    pub outcome: Outcome,
}

impl Classification {
    fn unchanged(current: PartGeometry, outcome: Outcome) -> Self {
        Self {
            from: current,
            geometry: current,
            outcome,
        }
    }

    fn classified(
        current: PartGeometry,
        geometry: PartGeometry,
        rule: Rule,
        ratio: f64,
        threshold: f64,
    ) -> Self {
        Self {
            from: current,
            geometry,
            outcome: Outcome::Classified {
                rule,
                ratio,
                threshold,
                degenerate_input: !ratio.is_finite(),
            },
        }
    }

    /// Whether the geometry tag was revised
    pub fn changed(&self) -> bool {
        self.from != self.geometry
    }
}

/// Shape classifier with configurable thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    thresholds: ClassificationThresholds,
}

impl Classifier {
    pub fn new(thresholds: ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassificationThresholds {
        &self.thresholds
    }

    /// Classify a round part (ring/tube/disk/cylinder family)
    pub fn circular(
        &self,
        current: PartGeometry,
        diameter: Option<f64>,
        inner_diameter: Option<f64>,
        height: Option<f64>,
        wall_thickness: Option<f64>,
    ) -> PartGeometry {
        self.explain_circular(current, diameter, inner_diameter, height, wall_thickness)
            .geometry
    }

    /// Classify a prismatic part (plate/bar/box family)
    pub fn rectangular(
        &self,
        current: PartGeometry,
        length: Option<f64>,
        width: Option<f64>,
        thickness: Option<f64>,
    ) -> PartGeometry {
        self.explain_rectangular(current, length, width, thickness)
            .geometry
    }

    /// Classify using the full dimension set
    ///
    /// Circular rules run first; a revised tag from them is returned
    /// immediately. Otherwise the rectangular rules decide.
    pub fn classify(&self, current: PartGeometry, dims: &DimensionSet) -> PartGeometry {
        let circular = self.circular(
            current,
            dims.diameter,
            dims.inner_diameter,
            dims.height(),
            dims.wall_thickness,
        );
        if circular != current {
            return circular;
        }
        self.rectangular(current, dims.length, dims.width, dims.thickness)
    }

    /// Like [`Classifier::classify`], with the rule that decided the result
    pub fn explain(&self, current: PartGeometry, dims: &DimensionSet) -> Classification {
        let classification = match current.family() {
            ShapeFamily::Circular => self.explain_circular(
                current,
                dims.diameter,
                dims.inner_diameter,
                dims.height(),
                dims.wall_thickness,
            ),
            ShapeFamily::Rectangular => {
                self.explain_rectangular(current, dims.length, dims.width, dims.thickness)
            }
            ShapeFamily::Other => Classification::unchanged(current, Outcome::NotApplicable),
        };

        if classification.changed() {
            tracing::debug!(
                from = %classification.from,
                to = %classification.geometry,
                outcome = %classification.outcome,
                "geometry reclassified"
            );
        } else {
            tracing::trace!(
                geometry = %current,
                outcome = %classification.outcome,
                "geometry unchanged"
            );
        }

        classification
    }

    pub fn explain_circular(
        &self,
        current: PartGeometry,
        diameter: Option<f64>,
        inner_diameter: Option<f64>,
        height: Option<f64>,
        wall_thickness: Option<f64>,
    ) -> Classification {
        if !current.is_circular() {
            return Classification::unchanged(current, Outcome::NotApplicable);
        }

        let (diameter, height) = match (diameter, height) {
            (Some(d), Some(h)) => (d, h),
            _ => {
                let mut missing = Vec::new();
                if diameter.is_none() {
                    missing.push(DimensionField::Diameter.to_string());
                }
                if height.is_none() {
                    missing.push("height (length or thickness)".to_string());
                }
                return Classification::unchanged(current, Outcome::InsufficientData { missing });
            }
        };

        let inner = inner_diameter.filter(|id| *id > 0.0);

        match inner {
            None if current.is_always_hollow() => {
                Classification::unchanged(current, Outcome::PreservedHollow)
            }
            Some(inner) => {
                let wall = wall_thickness.unwrap_or((diameter - inner) / 2.0);
                if wall <= 0.0 || wall.is_nan() {
                    return Classification::unchanged(
                        current,
                        Outcome::DegenerateGeometry {
                            wall_thickness: wall,
                        },
                    );
                }

                let ratio = height / wall;
                let threshold = self.thresholds.ring_tube_ratio;
                let geometry = if ratio < threshold {
                    match current {
                        PartGeometry::RingForging | PartGeometry::RoundForgingStock => {
                            PartGeometry::RingForging
                        }
                        _ => PartGeometry::Ring,
                    }
                } else {
                    match current {
                        PartGeometry::Pipe | PartGeometry::Sleeve | PartGeometry::Bushing => current,
                        _ => PartGeometry::Tube,
                    }
                };
                Classification::classified(current, geometry, Rule::LengthToWall, ratio, threshold)
            }
            None => {
                let ratio = height / diameter;
                let threshold = self.thresholds.disk_cylinder_ratio;
                let geometry = if ratio < threshold {
                    match current {
                        PartGeometry::DiskForging | PartGeometry::RoundForgingStock => {
                            PartGeometry::DiskForging
                        }
                        _ => PartGeometry::Disk,
                    }
                } else {
                    match current {
                        PartGeometry::Shaft
                        | PartGeometry::RoundBar
                        | PartGeometry::RoundForgingStock => current,
                        _ => PartGeometry::Cylinder,
                    }
                };
                Classification::classified(
                    current,
                    geometry,
                    Rule::HeightToDiameter,
                    ratio,
                    threshold,
                )
            }
        }
    }

    pub fn explain_rectangular(
        &self,
        current: PartGeometry,
        length: Option<f64>,
        width: Option<f64>,
        thickness: Option<f64>,
    ) -> Classification {
        if !current.is_rectangular() {
            return Classification::unchanged(current, Outcome::NotApplicable);
        }

        let (length, width, thickness) = match (length, width, thickness) {
            (Some(l), Some(w), Some(t)) => (l, w, t),
            _ => {
                let missing = [
                    (DimensionField::Length, length),
                    (DimensionField::Width, width),
                    (DimensionField::Thickness, thickness),
                ]
                .iter()
                .filter(|(_, value)| value.is_none())
                .map(|(field, _)| field.to_string())
                .collect();
                return Classification::unchanged(current, Outcome::InsufficientData { missing });
            }
        };

        let mut sides = [length, width, thickness];
        sides.sort_by(|a, b| b.total_cmp(a));
        let [largest, middle, smallest] = sides;

        let width_to_thickness = middle / smallest;
        let length_to_width = largest / middle;

        if width_to_thickness > self.thresholds.plate_ratio {
            let geometry = match current {
                PartGeometry::Sheet | PartGeometry::Slab => current,
                _ => PartGeometry::Plate,
            };
            Classification::classified(
                current,
                geometry,
                Rule::WidthToThickness,
                width_to_thickness,
                self.thresholds.plate_ratio,
            )
        } else if length_to_width > self.thresholds.bar_ratio {
            let geometry = match current {
                PartGeometry::FlatBar | PartGeometry::RectangularBar | PartGeometry::SquareBar => {
                    current
                }
                _ => PartGeometry::Bar,
            };
            Classification::classified(
                current,
                geometry,
                Rule::LengthToWidth,
                length_to_width,
                self.thresholds.bar_ratio,
            )
        } else {
            let geometry = match current {
                PartGeometry::Billet | PartGeometry::Block => current,
                _ => PartGeometry::Box,
            };
            Classification::classified(
                current,
                geometry,
                Rule::LengthToWidth,
                length_to_width,
                self.thresholds.bar_ratio,
            )
        }
    }
}

/// Classify a round part with the default thresholds
pub fn classify_circular_shape(
    current: PartGeometry,
    diameter: Option<f64>,
    inner_diameter: Option<f64>,
    height: Option<f64>,
    wall_thickness: Option<f64>,
) -> PartGeometry {
    Classifier::default().circular(current, diameter, inner_diameter, height, wall_thickness)
}

/// Classify a prismatic part with the default thresholds
pub fn classify_rectangular_shape(
    current: PartGeometry,
    length: Option<f64>,
    width: Option<f64>,
    thickness: Option<f64>,
) -> PartGeometry {
    Classifier::default().rectangular(current, length, width, thickness)
}

/// Classify a part with the default thresholds
pub fn classify_shape(current: PartGeometry, dims: &DimensionSet) -> PartGeometry {
    Classifier::default().classify(current, dims)
}

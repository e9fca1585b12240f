//! Solid job specs for the external CAD engine
//!
//! A [`SolidSpec`] describes one solid body as a short list of operations:
//! either circles in the XY sketch plane followed by a single extrusion, or
//! one base box. Box cuts and through-holes can follow either form. Specs
//! are plain data (JSON on the wire) and are validated here before they are
//! handed to the engine.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::dimensions::{DimensionField, DimensionSet};
use crate::core::geometry::{PartGeometry, ShapeFamily};

/// A circle in the XY sketch plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchCircle {
    pub radius: f64,
    /// Cut out of the main solid instead of adding material (e.g. a bore)
    #[serde(default)]
    pub is_hole: bool,
}

/// Extrusion along +Z of the current sketch profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrude {
    pub length: f64,
}

/// Axis-aligned base box on the XY plane, extending along +Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseBox {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    #[serde(default = "default_true")]
    pub centered_xy: bool,
    #[serde(default)]
    pub centered_z: bool,
}

fn default_true() -> bool {
    true
}

/// Axis-aligned box subtracted from the solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutBox {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub center: [f64; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

/// Cylindrical hole cut through the solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughHole {
    pub radius: f64,
    pub depth: f64,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub center: [f64; 3],
}

/// One build step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    SketchCircle(SketchCircle),
    Extrude(Extrude),
    BaseBox(BaseBox),
    CutBox(CutBox),
    ThroughHole(ThroughHole),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SketchCircle(_) => "SketchCircle",
            Operation::Extrude(_) => "Extrude",
            Operation::BaseBox(_) => "BaseBox",
            Operation::CutBox(_) => "CutBox",
            Operation::ThroughHole(_) => "ThroughHole",
        }
    }
}

/// Description of how to build one solid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidSpec {
    pub id: String,
    pub operations: Vec<Operation>,
}

/// How the base solid is formed
#[derive(Debug, Clone, PartialEq)]
pub enum BaseSolid {
    Box(BaseBox),
    Extruded {
        profile: Vec<SketchCircle>,
        holes: Vec<SketchCircle>,
        extrude: Extrude,
    },
}

/// A validated spec, grouped the way the engine builds it
#[derive(Debug, Clone, PartialEq)]
pub struct SolidPlan {
    pub base: BaseSolid,
    pub cut_boxes: Vec<CutBox>,
    pub through_holes: Vec<ThroughHole>,
}

#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum SolidSpecError {
    #[error("solid '{0}' contains no operations")]
    #[diagnostic(code(scanmaster::solid::empty))]
    NoOperations(String),

    #[error("{0} must be positive")]
    #[diagnostic(code(scanmaster::solid::non_positive))]
    NonPositive(&'static str),

    #[error("solid '{0}' contains multiple Extrude operations; only one is supported")]
    #[diagnostic(code(scanmaster::solid::multiple_extrudes))]
    MultipleExtrudes(String),

    #[error("solid '{0}' defines multiple BaseBox operations; only one base primitive is supported")]
    #[diagnostic(code(scanmaster::solid::multiple_base_boxes))]
    MultipleBaseBoxes(String),

    #[error("solid '{0}' mixes BaseBox with sketch/extrude operations")]
    #[diagnostic(
        code(scanmaster::solid::mixed_base),
        help("choose one style for the base solid")
    )]
    MixedBase(String),

    #[error("solid '{0}' must define either a BaseBox or an Extrude operation")]
    #[diagnostic(code(scanmaster::solid::no_base))]
    NoBase(String),

    #[error("solid '{0}' defines no positive geometry to extrude")]
    #[diagnostic(
        code(scanmaster::solid::no_profile),
        help("add a SketchCircle with is_hole: false")
    )]
    NoProfile(String),

    #[error("cannot build a solid for {geometry}: missing {field}")]
    #[diagnostic(code(scanmaster::solid::missing_dimension))]
    MissingDimension {
        geometry: PartGeometry,
        field: String,
    },

    #[error("no solid template for geometry '{0}'")]
    #[diagnostic(
        code(scanmaster::solid::unsupported),
        help("only circular and rectangular families can be derived")
    )]
    UnsupportedGeometry(PartGeometry),
}

fn positive(value: f64, what: &'static str) -> Result<(), SolidSpecError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SolidSpecError::NonPositive(what))
    }
}

impl SolidSpec {
    /// Check the operation list and group it into a build plan
    pub fn validate(&self) -> Result<SolidPlan, SolidSpecError> {
        if self.operations.is_empty() {
            return Err(SolidSpecError::NoOperations(self.id.clone()));
        }

        let mut circles: Vec<SketchCircle> = Vec::new();
        let mut extrude: Option<Extrude> = None;
        let mut base_box: Option<BaseBox> = None;
        let mut cut_boxes = Vec::new();
        let mut through_holes = Vec::new();

        for op in &self.operations {
            match op {
                Operation::SketchCircle(c) => {
                    positive(c.radius, "SketchCircle.radius")?;
                    circles.push(*c);
                }
                Operation::Extrude(e) => {
                    if extrude.is_some() {
                        return Err(SolidSpecError::MultipleExtrudes(self.id.clone()));
                    }
                    positive(e.length, "Extrude.length")?;
                    extrude = Some(*e);
                }
                Operation::BaseBox(b) => {
                    if base_box.is_some() {
                        return Err(SolidSpecError::MultipleBaseBoxes(self.id.clone()));
                    }
                    positive(b.width, "BaseBox.width")?;
                    positive(b.depth, "BaseBox.depth")?;
                    positive(b.height, "BaseBox.height")?;
                    base_box = Some(*b);
                }
                Operation::CutBox(b) => {
                    positive(b.width, "CutBox.width")?;
                    positive(b.depth, "CutBox.depth")?;
                    positive(b.height, "CutBox.height")?;
                    cut_boxes.push(*b);
                }
                Operation::ThroughHole(h) => {
                    positive(h.radius, "ThroughHole.radius")?;
                    positive(h.depth, "ThroughHole.depth")?;
                    through_holes.push(*h);
                }
            }
        }

        let base = match (base_box, extrude) {
            (Some(_), Some(_)) => return Err(SolidSpecError::MixedBase(self.id.clone())),
            (Some(_), None) if !circles.is_empty() => {
                return Err(SolidSpecError::MixedBase(self.id.clone()))
            }
            (Some(b), None) => BaseSolid::Box(b),
            (None, None) => return Err(SolidSpecError::NoBase(self.id.clone())),
            (None, Some(extrude)) => {
                let (holes, profile): (Vec<_>, Vec<_>) =
                    circles.into_iter().partition(|c| c.is_hole);
                if profile.is_empty() {
                    return Err(SolidSpecError::NoProfile(self.id.clone()));
                }
                BaseSolid::Extruded {
                    profile,
                    holes,
                    extrude,
                }
            }
        };

        Ok(SolidPlan {
            base,
            cut_boxes,
            through_holes,
        })
    }

    /// Derive the base solid for a classified part
    ///
    /// Round parts become an outer circle (plus a bore circle when hollow)
    /// extruded by the part height. Prismatic parts become a base box of
    /// length x width x thickness.
    pub fn from_part(
        id: impl Into<String>,
        geometry: PartGeometry,
        dims: &DimensionSet,
    ) -> Result<Self, SolidSpecError> {
        let require = |value: Option<f64>, field: &str| {
            value.ok_or_else(|| SolidSpecError::MissingDimension {
                geometry,
                field: field.to_string(),
            })
        };

        let operations = match geometry.family() {
            ShapeFamily::Circular => {
                let diameter = require(dims.diameter, DimensionField::Diameter.as_str())?;
                let height = require(dims.height(), "length or thickness")?;

                let mut ops = vec![Operation::SketchCircle(SketchCircle {
                    radius: diameter / 2.0,
                    is_hole: false,
                })];
                if let Some(inner) = dims.inner_diameter.filter(|id| *id > 0.0) {
                    ops.push(Operation::SketchCircle(SketchCircle {
                        radius: inner / 2.0,
                        is_hole: true,
                    }));
                } else if geometry.is_always_hollow() {
                    return Err(SolidSpecError::MissingDimension {
                        geometry,
                        field: DimensionField::InnerDiameter.to_string(),
                    });
                }
                ops.push(Operation::Extrude(Extrude { length: height }));
                ops
            }
            ShapeFamily::Rectangular => {
                let length = require(dims.length, DimensionField::Length.as_str())?;
                let width = require(dims.width, DimensionField::Width.as_str())?;
                let thickness = require(dims.thickness, DimensionField::Thickness.as_str())?;
                vec![Operation::BaseBox(BaseBox {
                    width: length,
                    depth: width,
                    height: thickness,
                    centered_xy: true,
                    centered_z: false,
                })]
            }
            ShapeFamily::Other => return Err(SolidSpecError::UnsupportedGeometry(geometry)),
        };

        let spec = Self {
            id: id.into(),
            operations,
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl fmt::Display for SolidSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.operations.iter().map(|op| op.name()).collect();
        write!(f, "{} [{}]", self.id, names.join(", "))
    }
}

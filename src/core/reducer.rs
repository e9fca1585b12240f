//! Part state reducer - apply one edit, re-derive, reclassify
//!
//! Each edit to a part's dimensions goes through [`reduce`], which returns
//! the next state with the wall thickness re-derived and the geometry
//! reclassified. The caller owns the ordering of edits, so a
//! reclassification can never retrigger itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::classify::{Classification, Classifier};
use crate::core::dimensions::{DimensionField, DimensionSet};
use crate::core::geometry::PartGeometry;

/// The classifier-relevant slice of a part record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartState {
    pub geometry: PartGeometry,
    pub dimensions: DimensionSet,
}

impl PartState {
    pub fn new(geometry: PartGeometry, dimensions: DimensionSet) -> Self {
        Self {
            geometry,
            dimensions,
        }
    }
}

/// A single change to a part
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartEdit {
    /// Set or clear one dimension
    Dimension {
        field: DimensionField,
        value: Option<f64>,
    },
    /// Explicit geometry choice by the user; not reclassified
    Geometry(PartGeometry),
}

impl PartEdit {
    pub fn set(field: DimensionField, value: f64) -> Self {
        PartEdit::Dimension {
            field,
            value: Some(value),
        }
    }

    pub fn clear(field: DimensionField) -> Self {
        PartEdit::Dimension { field, value: None }
    }
}

/// Result of applying one edit
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: PartState,
    /// Present when the edit triggered classification
    pub classification: Option<Classification>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ReducerError {
    #[error("wall_thickness is derived from diameter and inner_diameter; edit those instead")]
    DerivedField,

    #[error("{field} must be a finite number, got {value}")]
    InvalidValue { field: DimensionField, value: f64 },
}

/// Apply one edit to a part state
pub fn reduce(
    state: &PartState,
    edit: PartEdit,
    classifier: &Classifier,
) -> Result<Transition, ReducerError> {
    match edit {
        PartEdit::Geometry(geometry) => {
            tracing::debug!(from = %state.geometry, to = %geometry, "geometry selected");
            Ok(Transition {
                state: PartState::new(geometry, state.dimensions),
                classification: None,
            })
        }
        PartEdit::Dimension { field, value } => {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ReducerError::InvalidValue { field, value: v });
                }
            }

            if field == DimensionField::WallThickness
                && state.dimensions.wall_thickness_is_derived()
            {
                return Err(ReducerError::DerivedField);
            }

            let mut dimensions = state.dimensions;
            dimensions.set(field, value);

            // Clearing a diameter leaves a stale derived wall behind
            if field.is_diameter()
                && state.dimensions.wall_thickness_is_derived()
                && !dimensions.wall_thickness_is_derived()
            {
                dimensions.wall_thickness = None;
            }
            let dimensions = dimensions.with_derived_wall_thickness();

            tracing::trace!(%field, ?value, "dimension edited");

            let classification = classifier.explain(state.geometry, &dimensions);
            Ok(Transition {
                state: PartState::new(classification.geometry, dimensions),
                classification: Some(classification),
            })
        }
    }
}

/// Apply a sequence of edits, stopping at the first rejected one
pub fn reduce_all(
    state: &PartState,
    edits: &[PartEdit],
    classifier: &Classifier,
) -> Result<(PartState, Vec<Classification>), ReducerError> {
    let mut current = *state;
    let mut classifications = Vec::new();
    for edit in edits {
        let transition = reduce(&current, *edit, classifier)?;
        current = transition.state;
        classifications.extend(transition.classification);
    }
    Ok((current, classifications))
}

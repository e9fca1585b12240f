//! Part entity - a physical test article with geometry and dimensions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::classify::{Classification, Classifier};
use crate::core::dimensions::DimensionSet;
use crate::core::entity::{Entity, Status};
use crate::core::geometry::PartGeometry;
use crate::core::identity::PartId;
use crate::core::reducer::{reduce_all, PartEdit, PartState, ReducerError};
use crate::core::solid::{SolidSpec, SolidSpecError};

/// A Part record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Unique identifier
    pub id: PartId,

    /// Short title/description
    pub title: String,

    /// Drawing or catalogue part number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,

    /// Material specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    /// Geometry tag
    pub geometry: PartGeometry,

    /// Measured dimensions in mm
    #[serde(default)]
    pub dimensions: DimensionSet,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Status,

    pub created: DateTime<Utc>,

    pub author: String,

    /// Bumped on every write that changes the record
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Part {
    const FILE_SUFFIX: &'static str = ".sm.yaml";

    fn id_string(&self) -> String {
        self.id.to_string()
    }
}

impl Part {
    pub fn new(title: impl Into<String>, geometry: PartGeometry, author: impl Into<String>) -> Self {
        Self {
            id: PartId::new(),
            title: title.into(),
            part_number: None,
            material: None,
            geometry,
            dimensions: DimensionSet::default(),
            tags: Vec::new(),
            status: Status::default(),
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    pub fn state(&self) -> PartState {
        PartState::new(self.geometry, self.dimensions)
    }

    /// Apply edits through the reducer; the record is untouched on error
    pub fn apply(
        &mut self,
        edits: &[PartEdit],
        classifier: &Classifier,
    ) -> Result<Vec<Classification>, ReducerError> {
        let (state, classifications) = reduce_all(&self.state(), edits, classifier)?;
        self.set_state(state);
        Ok(classifications)
    }

    /// Re-run the classifier on the stored dimensions
    ///
    /// A stored wall thickness is replaced by the derived one first, so a
    /// hand-edited stale wall never decides the tag.
    pub fn reclassify(&mut self, classifier: &Classifier) -> Classification {
        let dimensions = self.dimensions.with_derived_wall_thickness();
        let classification = classifier.explain(self.geometry, &dimensions);
        self.set_state(PartState::new(classification.geometry, dimensions));
        classification
    }

    /// Solid job for the external CAD engine
    pub fn solid_spec(&self) -> Result<SolidSpec, SolidSpecError> {
        SolidSpec::from_part(self.id.to_string(), self.geometry, &self.dimensions)
    }

    fn set_state(&mut self, state: PartState) {
        if state != self.state() {
            self.geometry = state.geometry;
            self.dimensions = state.dimensions;
            self.entity_revision += 1;
        }
    }
}

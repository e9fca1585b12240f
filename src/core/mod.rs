//! Core module - classification rules and project plumbing

pub mod classify;
pub mod config;
pub mod custom_items;
pub mod dimensions;
pub mod entity;
pub mod geometry;
pub mod identity;
pub mod loader;
pub mod project;
pub mod reducer;
pub mod solid;

pub use classify::{
    classify_circular_shape, classify_rectangular_shape, classify_shape, Classification,
    is_valid_ratio, ClassificationThresholds, Classifier, Outcome, Rule, ThresholdOverrides,
};
pub use config::Config;
pub use custom_items::{CustomItemError, CustomItemStore, FileItemStore, MemoryItemStore};
pub use dimensions::{DimensionField, DimensionIssue, DimensionSet};
pub use entity::{Entity, Status};
pub use geometry::{PartGeometry, ShapeFamily};
pub use identity::{IdParseError, PartId};
pub use project::{Project, ProjectError};
pub use reducer::{reduce, reduce_all, PartEdit, PartState, ReducerError, Transition};
pub use solid::{SolidSpec, SolidSpecError};

//! ScanMaster: part geometry classification for ultrasonic inspection
//!
//! Parts are kept as plain YAML files in a project directory. Every
//! dimension edit re-derives the wall thickness and lets the classifier
//! revise the geometry tag (ring or tube, disk or cylinder, plate or bar).

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod yaml;

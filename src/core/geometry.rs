//! Part geometry tags and shape families

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Canonical kind of solid a part is
///
/// Drives which dimension fields apply to a part and which drawing routine
/// the presentation layer picks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartGeometry {
    // Circular family
    Ring,
    RingForging,
    Tube,
    Pipe,
    Sleeve,
    Bushing,
    Disk,
    DiskForging,
    Cylinder,
    RoundBar,
    Shaft,
    RoundForgingStock,

    // Rectangular family
    Plate,
    Sheet,
    Slab,
    Bar,
    FlatBar,
    RectangularBar,
    SquareBar,
    Billet,
    Block,
    Box,

    // Not classified
    Hexagon,
    Sphere,
    Cone,
    LProfile,
    TProfile,
    IProfile,
    UProfile,
    Custom,
}

/// Shape family a geometry tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFamily {
    /// Round parts: rings, tubes, disks, cylinders and their variants
    Circular,
    /// Prismatic parts: plates, bars, boxes and their variants
    Rectangular,
    /// Shapes the classifier never touches
    Other,
}

impl fmt::Display for ShapeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeFamily::Circular => write!(f, "circular"),
            ShapeFamily::Rectangular => write!(f, "rectangular"),
            ShapeFamily::Other => write!(f, "other"),
        }
    }
}

impl PartGeometry {
    /// Get the string representation of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            PartGeometry::Ring => "ring",
            PartGeometry::RingForging => "ring_forging",
            PartGeometry::Tube => "tube",
            PartGeometry::Pipe => "pipe",
            PartGeometry::Sleeve => "sleeve",
            PartGeometry::Bushing => "bushing",
            PartGeometry::Disk => "disk",
            PartGeometry::DiskForging => "disk_forging",
            PartGeometry::Cylinder => "cylinder",
            PartGeometry::RoundBar => "round_bar",
            PartGeometry::Shaft => "shaft",
            PartGeometry::RoundForgingStock => "round_forging_stock",
            PartGeometry::Plate => "plate",
            PartGeometry::Sheet => "sheet",
            PartGeometry::Slab => "slab",
            PartGeometry::Bar => "bar",
            PartGeometry::FlatBar => "flat_bar",
            PartGeometry::RectangularBar => "rectangular_bar",
            PartGeometry::SquareBar => "square_bar",
            PartGeometry::Billet => "billet",
            PartGeometry::Block => "block",
            PartGeometry::Box => "box",
            PartGeometry::Hexagon => "hexagon",
            PartGeometry::Sphere => "sphere",
            PartGeometry::Cone => "cone",
            PartGeometry::LProfile => "l_profile",
            PartGeometry::TProfile => "t_profile",
            PartGeometry::IProfile => "i_profile",
            PartGeometry::UProfile => "u_profile",
            PartGeometry::Custom => "custom",
        }
    }

    /// Get all geometry tags
    pub fn all() -> &'static [PartGeometry] {
        &[
            PartGeometry::Ring,
            PartGeometry::RingForging,
            PartGeometry::Tube,
            PartGeometry::Pipe,
            PartGeometry::Sleeve,
            PartGeometry::Bushing,
            PartGeometry::Disk,
            PartGeometry::DiskForging,
            PartGeometry::Cylinder,
            PartGeometry::RoundBar,
            PartGeometry::Shaft,
            PartGeometry::RoundForgingStock,
            PartGeometry::Plate,
            PartGeometry::Sheet,
            PartGeometry::Slab,
            PartGeometry::Bar,
            PartGeometry::FlatBar,
            PartGeometry::RectangularBar,
            PartGeometry::SquareBar,
            PartGeometry::Billet,
            PartGeometry::Block,
            PartGeometry::Box,
            PartGeometry::Hexagon,
            PartGeometry::Sphere,
            PartGeometry::Cone,
            PartGeometry::LProfile,
            PartGeometry::TProfile,
            PartGeometry::IProfile,
            PartGeometry::UProfile,
            PartGeometry::Custom,
        ]
    }

    /// Shape family used by the classifier's applicability guards
    pub fn family(&self) -> ShapeFamily {
        match self {
            PartGeometry::Ring
            | PartGeometry::RingForging
            | PartGeometry::Tube
            | PartGeometry::Pipe
            | PartGeometry::Sleeve
            | PartGeometry::Bushing
            | PartGeometry::Disk
            | PartGeometry::DiskForging
            | PartGeometry::Cylinder
            | PartGeometry::RoundBar
            | PartGeometry::Shaft
            | PartGeometry::RoundForgingStock => ShapeFamily::Circular,

            PartGeometry::Plate
            | PartGeometry::Sheet
            | PartGeometry::Slab
            | PartGeometry::Bar
            | PartGeometry::FlatBar
            | PartGeometry::RectangularBar
            | PartGeometry::SquareBar
            | PartGeometry::Billet
            | PartGeometry::Block
            | PartGeometry::Box => ShapeFamily::Rectangular,

            _ => ShapeFamily::Other,
        }
    }

    pub fn is_circular(&self) -> bool {
        self.family() == ShapeFamily::Circular
    }

    pub fn is_rectangular(&self) -> bool {
        self.family() == ShapeFamily::Rectangular
    }

    /// Tags that always describe a hollow part, whatever the inner diameter says
    pub fn is_always_hollow(&self) -> bool {
        matches!(
            self,
            PartGeometry::Tube
                | PartGeometry::Pipe
                | PartGeometry::Ring
                | PartGeometry::RingForging
                | PartGeometry::Sleeve
                | PartGeometry::Bushing
        )
    }
}

impl fmt::Display for PartGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PartGeometry {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .find(|g| g.as_str() == normalized)
            .copied()
            .ok_or_else(|| GeometryParseError::Unknown(s.to_string()))
    }
}

/// Errors from parsing a geometry tag
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryParseError {
    #[error("unknown part geometry: '{0}'")]
    Unknown(String),
}

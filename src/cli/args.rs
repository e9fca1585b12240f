//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    classify::ClassifyArgs, completions::CompletionsArgs, custom::CustomCommands, init::InitArgs,
    part::PartCommands, solid::SolidArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "scanmaster")]
#[command(author, version, about = "ScanMaster part geometry toolkit")]
#[command(
    long_about = "Classify part geometry for ultrasonic inspection planning and keep part records as plain YAML files."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .scanmaster/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ScanMaster project
    Init(InitArgs),

    /// Classify a geometry from dimensions (no project needed)
    Classify(ClassifyArgs),

    /// Part record management
    #[command(subcommand)]
    Part(PartCommands),

    /// User-defined list entries (materials, couplants, standards, ...)
    #[command(subcommand)]
    Custom(CustomCommands),

    /// Derive or check a CAD solid job
    Solid(SolidArgs),

    /// Validate part files against the schema and dimension checks
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable (tables for lists, styled text otherwise)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// Just IDs or tags, one per line
    Id,
}

/// Dimension flags shared by `classify` and `part new`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DimensionArgs {
    /// Outer diameter (mm)
    #[arg(long, visible_alias = "od")]
    pub diameter: Option<f64>,

    /// Inner diameter (mm)
    #[arg(long, visible_alias = "id")]
    pub inner_diameter: Option<f64>,

    /// Length (mm)
    #[arg(long)]
    pub length: Option<f64>,

    /// Width (mm)
    #[arg(long)]
    pub width: Option<f64>,

    /// Thickness (mm)
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Wall thickness (mm); derived when both diameters are given
    #[arg(long, visible_alias = "wall")]
    pub wall_thickness: Option<f64>,
}

impl DimensionArgs {
    /// Flags in field order, with their values
    pub fn values(&self) -> [(crate::core::DimensionField, Option<f64>); 6] {
        use crate::core::DimensionField as F;
        [
            (F::Diameter, self.diameter),
            (F::InnerDiameter, self.inner_diameter),
            (F::Length, self.length),
            (F::Width, self.width),
            (F::Thickness, self.thickness),
            (F::WallThickness, self.wall_thickness),
        ]
    }
}

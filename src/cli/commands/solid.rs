//! `scanmaster solid` command - CAD solid jobs
//!
//! The job is a JSON list of build operations handed to an external CAD
//! engine. This command derives one from a stored part, or checks a job
//! file written elsewhere.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{effective_format, open_project};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::load_entity;
use crate::core::solid::SolidSpec;
use crate::core::Config;
use crate::entities::Part;

#[derive(clap::Args, Debug)]
pub struct SolidArgs {
    /// Part ID or unique ID prefix to derive the job from
    #[arg(required_unless_present = "check", conflicts_with = "check")]
    pub id: Option<String>,

    /// Check an existing job file instead
    #[arg(long, value_name = "FILE")]
    pub check: Option<PathBuf>,

    /// Write the derived job to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: SolidArgs, global: &GlobalOpts) -> Result<()> {
    if let Some(path) = args.check {
        return check(&path, global);
    }

    let query = args
        .id
        .ok_or_else(|| miette::miette!("Part ID is required unless --check is given"))?;
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let path = project
        .find_part_file(&query)
        .map_err(|e| miette::miette!("{}", e))?;
    let part: Part = load_entity(&path)?;
    let spec = part.solid_spec()?;
    tracing::debug!(part = %part.id, job = %spec, "derived solid job");

    if let Some(output) = args.output {
        let json = serde_json::to_string_pretty(&spec).into_diagnostic()?;
        std::fs::write(&output, json + "\n").into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Wrote solid job for {} to {}",
                style("✓").green(),
                style(&spec.id).cyan(),
                style(output.display()).dim()
            );
        }
        return Ok(());
    }

    match effective_format(global, &config) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&spec).into_diagnostic()?),
        OutputFormat::Id => println!("{}", spec.id),
        OutputFormat::Tsv => {
            for op in &spec.operations {
                println!("{}\t{}", spec.id, op.name());
            }
        }
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(&spec).into_diagnostic()?)
        }
    }

    Ok(())
}

fn check(path: &PathBuf, global: &GlobalOpts) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))?;
    let spec: SolidSpec = serde_json::from_str(&content)
        .map_err(|e| miette::miette!("{} is not a solid job: {}", path.display(), e))?;

    let plan = spec.validate()?;
    tracing::debug!(?plan, "solid job accepted");

    if !global.quiet {
        println!(
            "{} {} is a valid solid job ({})",
            style("✓").green(),
            style(path.display()).cyan(),
            spec
        );
    }
    Ok(())
}

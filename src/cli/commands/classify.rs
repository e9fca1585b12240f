//! `scanmaster classify` command - one-shot geometry classification

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{dims_summary, effective_format, open_project};
use crate::cli::{DimensionArgs, GlobalOpts, OutputFormat};
use crate::core::classify::Classification;
use crate::core::dimensions::DimensionSet;
use crate::core::geometry::PartGeometry;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Current geometry tag (e.g. tube, ring_forging, plate)
    #[arg(long = "type", short = 't', value_name = "TAG")]
    pub geometry: PartGeometry,

    #[command(flatten)]
    pub dims: DimensionArgs,

    /// Show which rule decided the result
    #[arg(long, short = 'e')]
    pub explain: bool,
}

/// Dimension set from command-line flags, with the wall thickness derived
pub fn dimensions_from_args(args: &DimensionArgs) -> DimensionSet {
    let mut dims = DimensionSet::default();
    for (field, value) in args.values() {
        dims.set(field, value);
    }
    dims.with_derived_wall_thickness()
}

pub fn run(args: ClassifyArgs, global: &GlobalOpts) -> Result<()> {
    // Project is optional here; it only contributes thresholds
    let project = open_project(global).ok();
    let config = Config::load_for(project.as_ref());
    let classifier = config.classifier();

    let dims = dimensions_from_args(&args.dims);
    if !global.quiet {
        for issue in dims.check() {
            eprintln!("{} {}", style("!").yellow(), issue);
        }
    }

    let classification = classifier.explain(args.geometry, &dims);
    print_classification(&classification, &dims, args.explain, effective_format(global, &config))
}

pub fn print_classification(
    classification: &Classification,
    dims: &DimensionSet,
    explain: bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(classification).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(classification).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Tsv => {
            println!(
                "{}\t{}\t{}",
                classification.from, classification.geometry, classification.outcome
            );
        }
        OutputFormat::Id => println!("{}", classification.geometry),
        OutputFormat::Auto if !explain => println!("{}", classification.geometry),
        OutputFormat::Auto => {
            let arrow = if classification.changed() {
                style("→").green()
            } else {
                style("=").dim()
            };
            println!(
                "{} {} {}",
                style(classification.from).dim(),
                arrow,
                style(classification.geometry).cyan().bold()
            );
            println!("  {}: {}", style("Rule").bold(), classification.outcome);
            println!("  {}: {}", style("Dimensions").bold(), dims_summary(dims));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_from_args_derives_wall() {
        let args = DimensionArgs {
            diameter: Some(100.0),
            inner_diameter: Some(80.0),
            length: Some(49.0),
            ..Default::default()
        };
        let dims = dimensions_from_args(&args);
        assert_eq!(dims.wall_thickness, Some(10.0));
        assert_eq!(dims.length, Some(49.0));
    }
}

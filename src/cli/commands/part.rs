//! `scanmaster part` command - Part record management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::classify::print_classification;
use crate::cli::helpers::{dims_summary, effective_format, format_dim, open_project, truncate_str};
use crate::cli::{DimensionArgs, GlobalOpts, OutputFormat};
use crate::core::classify::Classification;
use crate::core::custom_items::CustomItemStore;
use crate::core::dimensions::{DimensionField, DimensionSet};
use crate::core::entity::Status;
use crate::core::geometry::{PartGeometry, ShapeFamily};
use crate::core::loader::{load_all, load_entity, save_entity};
use crate::core::project::Project;
use crate::core::reducer::{reduce_all, PartEdit};
use crate::core::Config;
use crate::entities::Part;
use crate::schema::template::TemplateGenerator;
use crate::schema::wizard::{PartWizard, MATERIAL_CATEGORY};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List parts with filtering
    List(ListArgs),

    /// Create a new part
    New(NewArgs),

    /// Show a part's details
    Show(ShowArgs),

    /// Change dimensions or metadata; dimension edits reclassify the part
    Set(SetArgs),

    /// Re-run the classifier on a stored part
    Classify(ClassifyPartArgs),

    /// Edit a part file in your editor
    Edit(EditArgs),
}

/// Shape family filter for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FamilyFilter {
    Circular,
    Rectangular,
    Other,
}

impl FamilyFilter {
    fn matches(&self, family: ShapeFamily) -> bool {
        matches!(
            (self, family),
            (FamilyFilter::Circular, ShapeFamily::Circular)
                | (FamilyFilter::Rectangular, ShapeFamily::Rectangular)
                | (FamilyFilter::Other, ShapeFamily::Other)
        )
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by shape family
    #[arg(long)]
    pub family: Option<FamilyFilter>,

    /// Filter by geometry tag
    #[arg(long = "type", short = 't', value_name = "TAG")]
    pub geometry: Option<PartGeometry>,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<Status>,

    /// Search in title, part number and material (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Initial geometry tag
    #[arg(long = "type", value_name = "TAG")]
    pub geometry: Option<PartGeometry>,

    /// Drawing or catalogue part number
    #[arg(long, short = 'p')]
    pub part_number: Option<String>,

    /// Material specification (remembered in the custom material list)
    #[arg(long, short = 'm')]
    pub material: Option<String>,

    /// Tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    #[command(flatten)]
    pub dims: DimensionArgs,

    /// Keep the given geometry tag as-is
    #[arg(long)]
    pub no_classify: bool,

    /// Prompt for the values interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part ID or unique ID prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Part ID or unique ID prefix
    pub id: String,

    #[command(flatten)]
    pub dims: DimensionArgs,

    /// Clear a dimension (repeatable)
    #[arg(long, value_name = "FIELD")]
    pub clear: Vec<DimensionField>,

    /// Select a geometry tag explicitly; applied before dimension edits
    #[arg(long = "type", value_name = "TAG")]
    pub geometry: Option<PartGeometry>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'p')]
    pub part_number: Option<String>,

    #[arg(long, short = 'm')]
    pub material: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<Status>,
}

#[derive(clap::Args, Debug)]
pub struct ClassifyPartArgs {
    /// Part ID or unique ID prefix
    pub id: String,

    /// Show the result without writing the file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part ID or unique ID prefix
    pub id: String,
}

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, global),
        PartCommands::New(args) => run_new(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Set(args) => run_set(args, global),
        PartCommands::Classify(args) => run_classify(args, global),
        PartCommands::Edit(args) => run_edit(args, global),
    }
}

fn load_part(project: &Project, query: &str) -> Result<(std::path::PathBuf, Part)> {
    let path = project
        .find_part_file(query)
        .map_err(|e| miette::miette!("{}", e))?;
    let part: Part = load_entity(&path)?;
    Ok((path, part))
}

fn dimension_edits(dims: &DimensionArgs) -> Vec<PartEdit> {
    dims.values()
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| PartEdit::set(field, v)))
        .collect()
}

/// Add a material to the custom list once the edit it came with has succeeded
fn remember_material(store: &mut dyn CustomItemStore, material: Option<&str>) -> Result<bool> {
    match material {
        Some(mat) => store.add(MATERIAL_CATEGORY, mat).into_diagnostic(),
        None => Ok(false),
    }
}

fn print_change(classification: &Classification) {
    if classification.changed() {
        println!(
            "   {} {} {} {} ({})",
            style("Geometry:").dim(),
            classification.from,
            style("→").green(),
            style(classification.geometry).cyan(),
            classification.outcome
        );
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));

    let needle = args.search.as_deref().map(str::to_lowercase);
    let parts: Vec<Part> = load_all::<Part>(project.iter_part_files())
        .into_iter()
        .map(|(_, part)| part)
        .filter(|p| args.family.map_or(true, |f| f.matches(p.geometry.family())))
        .filter(|p| args.geometry.map_or(true, |g| p.geometry == g))
        .filter(|p| args.status.map_or(true, |s| p.status == s))
        .filter(|p| match &needle {
            Some(n) => [Some(&p.title), p.part_number.as_ref(), p.material.as_ref()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(n)),
            None => true,
        })
        .collect();

    if args.count {
        println!("{}", parts.len());
        return Ok(());
    }

    match effective_format(global, &config) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&parts).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&parts).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for part in &parts {
                println!("{}", part.id);
            }
        }
        OutputFormat::Tsv => {
            for part in &parts {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    part.id,
                    part.geometry,
                    part.status,
                    part.title,
                    dims_summary(&part.dimensions)
                );
            }
        }
        OutputFormat::Auto => {
            if parts.is_empty() {
                println!("No parts found.");
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["ID", "Title", "Geometry", "Status", "OD", "ID", "L", "W", "T"]);
            for part in &parts {
                let d = &part.dimensions;
                builder.push_record([
                    part.id.to_string(),
                    truncate_str(&part.title, 30),
                    part.geometry.to_string(),
                    part.status.to_string(),
                    format_dim(d.diameter),
                    format_dim(d.inner_diameter),
                    format_dim(d.length),
                    format_dim(d.width),
                    format_dim(d.thickness),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));

            if !global.quiet {
                println!();
                println!("{} part(s) found", style(parts.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let mut store = project.custom_items();

    let (title, geometry, part_number, material, dims) = if args.interactive {
        let result = PartWizard::new().run(args.title.as_deref(), args.geometry, &mut store)?;
        (
            result.title,
            result.geometry,
            result.part_number.or(args.part_number),
            result.material.or(args.material),
            result.dimensions,
        )
    } else {
        let title = args
            .title
            .ok_or_else(|| miette::miette!("Title is required (use --title or -t)"))?;
        let geometry = args
            .geometry
            .ok_or_else(|| miette::miette!("Geometry is required (use --type)"))?;
        let mut dims = DimensionSet::default();
        for (field, value) in args.dims.values() {
            dims.set(field, value);
        }
        (title, geometry, args.part_number, args.material, dims)
    };

    let mut part = Part::new(title, geometry, config.author());
    part.part_number = part_number;
    part.material = material.map(|m| m.trim().to_string());
    part.tags = args.tags;

    let mut classifications = Vec::new();
    if args.no_classify {
        part.dimensions = dims.with_derived_wall_thickness();
    } else {
        let edits: Vec<PartEdit> = DimensionField::all()
            .iter()
            .filter_map(|f| dims.get(*f).map(|v| PartEdit::set(*f, v)))
            .collect();
        let (state, results) = reduce_all(&part.state(), &edits, &config.classifier())
            .map_err(|e| miette::miette!("{}", e))?;
        part.geometry = state.geometry;
        part.dimensions = state.dimensions;
        classifications = results;
    }

    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let yaml_content = generator
        .generate_part(&part)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = project.part_path(&part.id);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(&file_path, &yaml_content).into_diagnostic()?;
    let material_added = remember_material(&mut store, part.material.as_deref())?;

    if global.format == OutputFormat::Id || global.quiet {
        println!("{}", part.id);
        return Ok(());
    }

    println!(
        "{} Created part {}",
        style("✓").green(),
        style(&part.id.to_string()).cyan()
    );
    println!("   {}", style(file_path.display()).dim());
    println!(
        "   {} | {}",
        style(part.geometry).yellow(),
        style(&part.title).white()
    );
    if let Some(last) = classifications.iter().rev().find(|c| c.changed()) {
        let overall = Classification {
            from: geometry,
            ..last.clone()
        };
        print_change(&overall);
    }
    if material_added {
        if let Some(ref mat) = part.material {
            println!(
                "   {} '{}' added to the custom {} list",
                style("Material:").dim(),
                mat,
                MATERIAL_CATEGORY
            );
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let (path, part) = load_part(&project, &args.id)?;

    match effective_format(global, &config) {
        OutputFormat::Yaml => {
            let content = std::fs::read_to_string(&path).into_diagnostic()?;
            print!("{}", content);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&part).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", part.id),
        OutputFormat::Tsv => {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                part.id,
                part.geometry,
                part.status,
                part.title,
                dims_summary(&part.dimensions)
            );
        }
        OutputFormat::Auto => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(&part.id.to_string()).cyan()
            );
            println!("{}: {}", style("Title").bold(), style(&part.title).yellow());
            if let Some(ref pn) = part.part_number {
                println!("{}: {}", style("Part Number").bold(), pn);
            }
            if let Some(ref mat) = part.material {
                println!("{}: {}", style("Material").bold(), mat);
            }
            println!(
                "{}: {} ({})",
                style("Geometry").bold(),
                style(part.geometry).green(),
                part.geometry.family()
            );
            println!("{}: {}", style("Status").bold(), part.status);
            println!("{}", style("─".repeat(60)).dim());

            if !part.dimensions.is_empty() {
                println!();
                println!("{}", style("Dimensions (mm):").bold());
                for field in DimensionField::all() {
                    if let Some(value) = part.dimensions.get(*field) {
                        let derived = *field == DimensionField::WallThickness
                            && part.dimensions.wall_thickness_is_derived();
                        println!(
                            "  {}: {}{}",
                            style(field).dim(),
                            value,
                            if derived { " (derived)" } else { "" }
                        );
                    }
                }
            }

            let issues = part.dimensions.check();
            if !issues.is_empty() {
                println!();
                println!("{}", style("Dimension issues:").yellow().bold());
                for issue in issues {
                    println!("  {} {}", style("!").yellow(), issue);
                }
            }

            if !part.tags.is_empty() {
                println!();
                println!("{}: {}", style("Tags").bold(), part.tags.join(", "));
            }

            println!();
            println!(
                "{}",
                style(format!(
                    "Created {} by {} (revision {})",
                    part.created.format("%Y-%m-%d %H:%M"),
                    part.author,
                    part.entity_revision
                ))
                .dim()
            );
        }
    }

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let (path, mut part) = load_part(&project, &args.id)?;
    let revision_before = part.entity_revision;

    let mut edits = Vec::new();
    if let Some(geometry) = args.geometry {
        edits.push(PartEdit::Geometry(geometry));
    }
    edits.extend(dimension_edits(&args.dims));
    edits.extend(args.clear.iter().map(|f| PartEdit::clear(*f)));

    let mut metadata_changed = false;
    let material_given = args.material.is_some();
    if let Some(title) = args.title {
        metadata_changed |= part.title != title;
        part.title = title;
    }
    if let Some(pn) = args.part_number {
        metadata_changed |= part.part_number.as_deref() != Some(pn.as_str());
        part.part_number = Some(pn);
    }
    if let Some(mat) = args.material {
        let mat = mat.trim().to_string();
        metadata_changed |= part.material.as_deref() != Some(mat.as_str());
        part.material = Some(mat);
    }
    if let Some(status) = args.status {
        metadata_changed |= part.status != status;
        part.status = status;
    }

    if edits.is_empty() && !metadata_changed {
        return Err(miette::miette!(
            "Nothing to change. Pass a dimension flag, --clear, --type or a metadata flag."
        ));
    }

    let from = part.geometry;
    let classifications = part
        .apply(&edits, &config.classifier())
        .map_err(|e| miette::miette!("{}", e))?;
    if material_given {
        remember_material(&mut project.custom_items(), part.material.as_deref())?;
    }
    if metadata_changed && part.entity_revision == revision_before {
        part.entity_revision += 1;
    }

    if part.entity_revision == revision_before {
        if !global.quiet {
            println!("{} {} unchanged", style("=").dim(), style(&part.id.to_string()).cyan());
        }
        return Ok(());
    }

    save_entity(&path, &part)?;

    if global.quiet {
        return Ok(());
    }
    println!(
        "{} Updated part {}",
        style("✓").green(),
        style(&part.id.to_string()).cyan()
    );
    if let Some(last) = classifications.iter().rev().find(|c| c.changed()) {
        print_change(&Classification {
            from,
            ..last.clone()
        });
    } else if from != part.geometry {
        println!(
            "   {} {} {} {}",
            style("Geometry:").dim(),
            from,
            style("→").green(),
            style(part.geometry).cyan()
        );
    }
    println!("   {} {}", style("Dimensions:").dim(), dims_summary(&part.dimensions));

    Ok(())
}

fn run_classify(args: ClassifyPartArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let (path, mut part) = load_part(&project, &args.id)?;
    let revision_before = part.entity_revision;

    let classification = part.reclassify(&config.classifier());
    let format = effective_format(global, &config);

    if args.dry_run {
        print_classification(&classification, &part.dimensions, true, format)?;
        if format == OutputFormat::Auto && !global.quiet {
            println!("{}", style("(dry run, nothing written)").dim());
        }
        return Ok(());
    }

    if part.entity_revision != revision_before {
        save_entity(&path, &part)?;
    }

    match format {
        OutputFormat::Auto if !global.quiet => {
            if classification.changed() {
                println!(
                    "{} {} {} {} {}",
                    style("✓").green(),
                    style(&part.id.to_string()).cyan(),
                    classification.from,
                    style("→").green(),
                    style(classification.geometry).cyan().bold()
                );
            } else {
                println!(
                    "{} {} stays {}",
                    style("=").dim(),
                    style(&part.id.to_string()).cyan(),
                    classification.geometry
                );
            }
            println!("   {}", style(&classification.outcome).dim());
        }
        OutputFormat::Auto => {}
        other => print_classification(&classification, &part.dimensions, true, other)?,
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let path = project
        .find_part_file(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );

    config.run_editor(&path).into_diagnostic()?;

    // Surface mistakes right away rather than on the next command
    load_entity::<Part>(&path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_edits_keep_field_order() {
        let dims = DimensionArgs {
            length: Some(10.0),
            diameter: Some(50.0),
            ..Default::default()
        };
        let edits = dimension_edits(&dims);
        assert_eq!(
            edits,
            vec![
                PartEdit::set(DimensionField::Diameter, 50.0),
                PartEdit::set(DimensionField::Length, 10.0),
            ]
        );
    }

    #[test]
    fn test_remember_material() {
        let mut store = crate::core::custom_items::MemoryItemStore::new();
        assert!(remember_material(&mut store, Some("Inconel 718")).unwrap());
        assert!(!remember_material(&mut store, Some("inconel 718")).unwrap());
        assert!(!remember_material(&mut store, None).unwrap());
        assert_eq!(store.get(MATERIAL_CATEGORY).unwrap(), vec!["Inconel 718"]);
    }

    #[test]
    fn test_family_filter() {
        assert!(FamilyFilter::Circular.matches(ShapeFamily::Circular));
        assert!(!FamilyFilter::Circular.matches(ShapeFamily::Rectangular));
        assert!(FamilyFilter::Other.matches(PartGeometry::Sphere.family()));
    }
}

//! `scanmaster validate` command - Validate part files against the schema

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::classify::Classifier;
use crate::core::entity::Entity;
use crate::core::loader::{load_entity, save_entity};
use crate::core::Config;
use crate::entities::Part;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: every part in the project)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,

    /// Re-derive wall thickness and geometry in-place
    #[arg(long)]
    pub fix: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
    files_fixed: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let classifier = config.classifier();
    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);

    let files: Vec<PathBuf> = if args.paths.is_empty() {
        project.iter_part_files().collect()
    } else {
        expand_paths(&args.paths)
    };

    let mut stats = ValidationStats::default();
    let mut had_error = false;
    let report = !args.summary && !global.quiet;

    if report {
        println!(
            "{} Validating {} file(s)...\n",
            style("→").blue(),
            files.len()
        );
    }

    for path in &files {
        stats.files_checked += 1;

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if report {
                    println!("{} {} - {}", style("✗").red(), path.display(), e);
                }
                stats.files_failed += 1;
                stats.total_errors += 1;
                had_error = true;
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        let filename = path.file_name().unwrap_or_default().to_string_lossy();

        if let Err(e) = validator.validate_part(&content, &filename) {
            stats.files_failed += 1;
            stats.total_errors += e.violation_count();
            had_error = true;

            if report {
                println!(
                    "{} {} - {} error(s)",
                    style("✗").red(),
                    path.display(),
                    e.violation_count()
                );
                println!("{:?}", miette::Report::new(e));
            }

            if !args.keep_going {
                break;
            }
            continue;
        }

        let issues = match check_part(path, &classifier, args.fix) {
            Ok(Check::Clean) => Vec::new(),
            Ok(Check::Fixed) => {
                stats.files_fixed += 1;
                stats.files_passed += 1;
                if report {
                    println!("{} {} (fixed)", style("✓").green(), path.display());
                }
                continue;
            }
            Ok(Check::Issues(issues)) => issues,
            Err(e) => {
                stats.files_failed += 1;
                stats.total_errors += 1;
                had_error = true;
                if report {
                    println!("{} {}", style("✗").red(), path.display());
                    println!("{:?}", e);
                }
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        if issues.is_empty() {
            stats.files_passed += 1;
            if report {
                println!("{} {}", style("✓").green(), path.display());
            }
            continue;
        }

        stats.total_warnings += issues.len();
        if report {
            println!(
                "{} {} - {} warning(s)",
                style("!").yellow(),
                path.display(),
                issues.len()
            );
            for issue in &issues {
                println!("    {}", style(issue).yellow());
            }
        }
        if args.strict {
            stats.files_failed += 1;
            had_error = true;
        } else {
            stats.files_passed += 1;
        }
    }

    if !global.quiet {
        print_summary(&stats);
    }

    if had_error {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        if !global.quiet {
            println!("{} All files passed validation!", style("✓").green().bold());
        }
        Ok(())
    }
}

enum Check {
    Clean,
    Fixed,
    Issues(Vec<String>),
}

/// Dimension consistency and classification checks on a schema-valid file
fn check_part(path: &Path, classifier: &Classifier, fix: bool) -> Result<Check> {
    let mut part: Part = load_entity(path)?;
    let revision = part.entity_revision;

    let mut issues: Vec<String> = part
        .dimensions
        .check()
        .iter()
        .map(|issue| issue.to_string())
        .collect();

    // Classify as the fix would: on the derived wall, not a stale stored one
    let derived = part.dimensions.with_derived_wall_thickness();
    let classification = classifier.explain(part.geometry, &derived);
    if classification.changed() {
        issues.push(format!(
            "geometry {} should be {} ({})",
            classification.from, classification.geometry, classification.outcome
        ));
    }

    if issues.is_empty() {
        return Ok(Check::Clean);
    }
    if !fix {
        return Ok(Check::Issues(issues));
    }

    part.reclassify(classifier);
    if part.entity_revision == revision {
        // Nothing the reclassifier can repair, e.g. a negative length
        return Ok(Check::Issues(issues));
    }
    save_entity(path, &part)?;
    tracing::info!(part = %part.id, "fixed derived values");

    let remaining: Vec<String> = part
        .dimensions
        .check()
        .iter()
        .map(|issue| issue.to_string())
        .collect();
    if remaining.is_empty() {
        Ok(Check::Fixed)
    } else {
        Ok(Check::Issues(remaining))
    }
}

fn print_summary(stats: &ValidationStats) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    if stats.total_warnings > 0 {
        println!("  Total warnings: {}", style(stats.total_warnings).yellow());
    }
    if stats.files_fixed > 0 {
        println!("  Files fixed:    {}", style(stats.files_fixed).cyan());
    }
    println!();
}

/// Expand directories into the part files beneath them
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if entry.path().to_string_lossy().ends_with(Part::FILE_SUFFIX) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::PartGeometry;
    use tempfile::tempdir;

    #[test]
    fn test_expand_paths_filters_part_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.sm.yaml"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let explicit = dir.path().join("notes.txt");

        let files = expand_paths(&[dir.path().to_path_buf(), explicit.clone()]);
        assert_eq!(files, vec![dir.path().join("a.sm.yaml"), explicit]);
    }

    #[test]
    fn test_check_part_classifies_on_derived_wall() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("part.sm.yaml");
        let mut part = Part::new("Liner", PartGeometry::Tube, "tester");
        part.dimensions.diameter = Some(100.0);
        part.dimensions.inner_diameter = Some(80.0);
        part.dimensions.wall_thickness = Some(20.0);
        part.dimensions.length = Some(60.0);
        save_entity(&path, &part).unwrap();

        let classifier = Classifier::default();
        match check_part(&path, &classifier, false).unwrap() {
            Check::Issues(issues) => {
                assert_eq!(issues.len(), 1);
                assert!(!issues[0].contains("should be"));
            }
            _ => panic!("expected the wall mismatch warning"),
        }

        assert!(matches!(
            check_part(&path, &classifier, true).unwrap(),
            Check::Fixed
        ));
        let fixed: Part = load_entity(&path).unwrap();
        assert_eq!(fixed.geometry, PartGeometry::Tube);
        assert_eq!(fixed.dimensions.wall_thickness, Some(10.0));
    }

    #[test]
    fn test_check_part_flags_and_fixes_misclassification() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("part.sm.yaml");
        let mut part = Part::new("Sleeve", PartGeometry::Tube, "tester");
        part.dimensions.diameter = Some(100.0);
        part.dimensions.inner_diameter = Some(80.0);
        part.dimensions.wall_thickness = Some(10.0);
        part.dimensions.length = Some(30.0);
        save_entity(&path, &part).unwrap();

        let classifier = Classifier::default();
        match check_part(&path, &classifier, false).unwrap() {
            Check::Issues(issues) => assert!(issues[0].contains("should be ring")),
            _ => panic!("expected a classification warning"),
        }

        assert!(matches!(
            check_part(&path, &classifier, true).unwrap(),
            Check::Fixed
        ));
        let fixed: Part = load_entity(&path).unwrap();
        assert_eq!(fixed.geometry, PartGeometry::Ring);
        assert!(matches!(
            check_part(&path, &classifier, false).unwrap(),
            Check::Clean
        ));
    }
}

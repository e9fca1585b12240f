//! `scanmaster custom` command - user-defined list entries

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::cli::helpers::{effective_format, open_project};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::custom_items::CustomItemStore;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum CustomCommands {
    /// List entries of one category, or of every category
    List(ListArgs),

    /// Add an entry to a category (duplicates are ignored, case-insensitively)
    Add(AddArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Category (e.g. material, couplant, standard)
    pub category: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Category (e.g. material, couplant, standard)
    pub category: String,

    /// Entry to add
    pub value: String,
}

pub fn run(cmd: CustomCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut store = project.custom_items();

    match cmd {
        CustomCommands::List(args) => {
            let config = Config::load_for(Some(&project));
            list(&store, args.category.as_deref(), effective_format(global, &config))
        }
        CustomCommands::Add(args) => {
            let added = store
                .add(&args.category, &args.value)
                .into_diagnostic()?;
            if global.quiet {
                return Ok(());
            }
            if added {
                println!(
                    "{} Added '{}' to {}",
                    style("✓").green(),
                    style(args.value.trim()).cyan(),
                    args.category.trim().to_lowercase()
                );
            } else {
                println!(
                    "{} '{}' is already in {}",
                    style("=").dim(),
                    args.value.trim(),
                    args.category.trim().to_lowercase()
                );
            }
            Ok(())
        }
    }
}

fn list(store: &dyn CustomItemStore, category: Option<&str>, format: OutputFormat) -> Result<()> {
    let categories = match category {
        Some(c) => vec![c.to_string()],
        None => store.categories().into_diagnostic()?,
    };

    let mut items: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for cat in categories {
        let entries = store.get(&cat).into_diagnostic()?;
        items.insert(cat.trim().to_lowercase(), entries);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&items).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (cat, entries) in &items {
                for entry in entries {
                    println!("{}\t{}", cat, entry);
                }
            }
        }
        OutputFormat::Id => {
            for entry in items.values().flatten() {
                println!("{}", entry);
            }
        }
        OutputFormat::Auto => {
            if items.values().all(|v| v.is_empty()) {
                println!("No custom items.");
                return Ok(());
            }
            for (cat, entries) in &items {
                println!("{} ({})", style(cat).bold(), entries.len());
                for entry in entries {
                    println!("  {}", entry);
                }
            }
        }
    }

    Ok(())
}

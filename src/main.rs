//! Crafting Calculator
//!
//! Raw-resource calculator for crafting recipe trees.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use craft_calculator::calculator;
use craft_calculator::catalog::RecipeCatalog;
use craft_calculator::config::CalculatorConfig;
use craft_calculator::error::CalcError;
use craft_calculator::loader;
use craft_calculator::models::{display_name, tier_label};
use craft_calculator::selection::{self, ItemFilter};

#[derive(Parser)]
#[command(name = "craft-calculator")]
#[command(about = "Raw-resource calculator for crafting recipe trees")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Recipe data file or directory (overrides the config file)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Maximum expansion depth (overrides the config file)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the raw resources needed to craft an item
    Calc {
        /// Item to craft (e.g., "iron_pickaxe")
        item: String,

        /// Number of items to craft
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        quantity: u64,

        /// Show the detailed requirement tree
        #[arg(short, long)]
        tree: bool,

        /// Print the tree and totals as JSON
        #[arg(long)]
        json: bool,
    },

    /// List craftable items
    List {
        #[arg(long)]
        category: Option<String>,

        /// Narrows --category
        #[arg(long, requires = "category")]
        sub_category: Option<String>,

        #[arg(long)]
        tier: Option<u32>,

        /// Case-insensitive name pattern
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show the categories and tiers available for filtering
    Categories,

    /// Show details for a specific item
    Item {
        /// Item ID
        id: String,
    },

    /// Load and validate the catalog
    Validate,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "craft_calculator=warn",
        1 => "craft_calculator=info",
        2 => "craft_calculator=debug",
        _ => "craft_calculator=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = CalculatorConfig::load(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog = catalog;
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    debug!(?config, "resolved configuration");

    let (catalog, stats) = loader::load_catalog(&config.catalog)?;

    match cli.command {
        Commands::Calc {
            item,
            quantity,
            tree,
            json,
        } => return calc(&catalog, &config, &item, quantity, tree, json),

        Commands::List {
            category,
            sub_category,
            tier,
            search,
        } => {
            let mut filter = ItemFilter::new();
            if let Some(c) = category {
                filter = filter.with_category(c);
            }
            if let Some(s) = sub_category {
                filter = filter.with_sub_category(s);
            }
            if let Some(t) = tier {
                filter = filter.with_tier(t);
            }
            if let Some(pattern) = search {
                filter = filter.with_search(&pattern)?;
            }

            let items = selection::select(&catalog, &filter);
            if items.is_empty() {
                println!("No craftable items match the filter.");
            } else {
                println!("{:<30} {:>8}  {:<15} {}", "Item", "Tier", "Category", "ID");
                println!("{}", "-".repeat(70));
                for (id, recipe) in items {
                    println!(
                        "{:<30} {:>8}  {:<15} {}",
                        display_name(id),
                        recipe.tier_label(),
                        recipe.category.as_deref().unwrap_or("-"),
                        id
                    );
                }
            }
        }

        Commands::Categories => {
            println!("Categories:");
            for category in selection::categories(&catalog) {
                let subs = selection::sub_categories(&catalog, &category);
                if subs.is_empty() {
                    println!("  {}", category);
                } else {
                    println!("  {} ({})", category, subs.join(", "));
                }
            }
            println!("Tiers:");
            for tier in selection::tiers(&catalog) {
                println!("  {}", tier_label(Some(tier)));
            }
        }

        Commands::Item { id } => match catalog.lookup(&id) {
            Some(recipe) => {
                println!("Item: {}", display_name(&id));
                println!("  ID: {}", id);
                println!("  Tier: {}", recipe.tier_label());
                println!("  Category: {}", recipe.category.as_deref().unwrap_or("-"));
                if let Some(sub) = &recipe.sub_category {
                    println!("  Sub-category: {}", sub);
                }
                if let Some(icon) = &recipe.icon {
                    println!("  Icon: {}", icon);
                }

                if recipe.is_raw() {
                    println!("  Raw resource");
                } else {
                    println!("  Requires:");
                    for i in &recipe.requires {
                        println!("    {}x {}", i.amount, display_name(&i.id));
                    }
                }

                let users = catalog.used_by(&id);
                if !users.is_empty() {
                    println!("  Used by:");
                    for (user, amount) in users {
                        println!("    {} ({}x)", display_name(user), amount);
                    }
                }
            }
            None => return Ok(unknown_item(&id)),
        },

        Commands::Validate => {
            println!("{}", stats);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn calc(
    catalog: &RecipeCatalog,
    config: &CalculatorConfig,
    item: &str,
    quantity: u64,
    tree: bool,
    json: bool,
) -> Result<ExitCode> {
    let summary = match calculator::summarize(catalog, item, quantity, config.max_depth) {
        Ok(summary) => summary,
        Err(CalcError::UnknownItem(id)) => return Ok(unknown_item(&id)),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    if tree {
        println!("Requirement tree:\n");
        println!("{}", calculator::format_tree(&summary.tree, 0));
    }
    println!("{}", summary);

    Ok(ExitCode::SUCCESS)
}

/// Unknown items are not fatal: report on stderr and leave stdout empty
fn unknown_item(id: &str) -> ExitCode {
    eprintln!("Item '{}' not found in catalog", id);
    ExitCode::from(2)
}

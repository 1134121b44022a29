//! Factory Planner - Command Line Interface
//!
//! This is the main entry point for the production planner.
//! Run with `--help` to see all available options.

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use factory_planner::{
    data::load_all_data,
    display::display_results,
    models::FactoryOptions,
    solver::solve_options,
};

/// Command-line arguments for the planner.
#[derive(Parser, Debug)]
#[command(name = "factory-planner")]
#[command(author, version, about = "Compute optimal factory production plans", long_about = None)]
struct Args {
    /// Planner configuration (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Directory containing the game data tables
    #[arg(short, long, default_value = "data")]
    data: PathBuf,

    /// Print the result document as JSON instead of a text report
    #[arg(long, default_value = "false")]
    json: bool,

    /// Enable the standard recipe set when the configuration enables none
    #[arg(long, default_value = "false")]
    default_recipes: bool,

    /// Log every solver pass
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if !args.data.exists() {
        eprintln!(
            "Error: data directory '{}' not found. Please run from the project root or pass --data.",
            args.data.display()
        );
        std::process::exit(1);
    }

    let data = load_all_data(&args.data)?;
    let mut options: FactoryOptions = serde_json::from_str(&fs::read_to_string(&args.config)?)?;
    if args.default_recipes && options.allowed_recipes.is_empty() {
        options.allowed_recipes = data.default_enabled_recipes();
    }

    let results = solve_options(&options, &data);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("Factory Planner");
        println!("================================================================");
        println!("  Data:             {}", args.data.display());
        println!("  Recipes enabled:  {}", options.allowed_recipes.len());
        println!("  Targets:          {}", options.production_items.len());
        display_results(&results, &data);
    }

    if !results.error.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}

//! Inspect and validate datasets saved by `schemaferry`.
//!
//! ## Usage
//!
//! ```sh
//! schemaferry inspect out/customers
//! schemaferry validate out/customers --feature "Customer Name:Text" --feature "Purchase Vector:OPVector"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::*;
use log::LevelFilter;

use schemaferry::bridge::{read_saved_schema, ColumnTag, DecodePlan, SavedLayout};
use schemaferry::{init_logging, validate, Feature, FeatureType, FerryError, InterchangeFormat, ParquetFormat};

/// Inspect and validate schema-preserving dataset saves
#[derive(Parser, Debug)]
#[command(name = "schemaferry")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log pipeline progress to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored schema of a saved dataset
    Inspect {
        /// Directory the dataset was saved to
        path: PathBuf,
    },

    /// Check features against a saved dataset without loading its data
    Validate {
        /// Directory the dataset was saved to
        path: PathBuf,

        /// Expected column, as `name:Type` (repeatable)
        #[arg(long = "feature", value_parser = parse_feature, required = true)]
        features: Vec<Feature>,
    },
}

/// Splits on the last ':' so column names may themselves contain colons.
fn parse_feature(arg: &str) -> Result<Feature, String> {
    let (name, type_name) = arg
        .rsplit_once(':')
        .ok_or_else(|| format!("expected name:Type, got '{}'", arg))?;
    let feature_type: FeatureType = type_name.parse().map_err(|e: FerryError| e.to_string())?;
    Ok(Feature::new(name, feature_type))
}

fn inspect(path: PathBuf) -> Result<bool, FerryError> {
    let side_file = read_saved_schema(&path)?;
    let rows = ParquetFormat.read_all(&SavedLayout::new(&path).data_dir())?.num_rows();

    println!("{} {}", "Dataset:".bold(), path.display());
    println!(
        "  written by {} at {} (format v{})",
        side_file.writer_version, side_file.written_at, side_file.format_version
    );
    println!("  {} columns, {} rows", side_file.schema.fields().len(), rows);
    println!();

    for (idx, field) in side_file.schema.fields().iter().enumerate() {
        let tag = ColumnTag::read(field)?;
        let kind = if tag.is_vector {
            "vector".cyan()
        } else {
            "scalar".normal()
        };
        println!(
            "  [{idx}] {:<24} <- {:<24} {:<6} {}",
            field.name().bold(),
            format!("\"{}\"", tag.original_name),
            kind,
            field.data_type()
        );
    }
    Ok(true)
}

fn validate_saved(path: PathBuf, features: Vec<Feature>) -> Result<bool, FerryError> {
    let side_file = read_saved_schema(&path)?;
    let logical = DecodePlan::from_stored(&side_file.schema)?.logical_schema();

    let diagnostics = validate(&logical, &features);
    if diagnostics.is_empty() {
        println!("{} {} features match {}", "OK".green().bold(), features.len(), path.display());
        return Ok(true);
    }
    for diagnostic in &diagnostics {
        eprintln!("{} {}", "error:".red().bold(), diagnostic);
    }
    Ok(false)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = init_logging(level, None) {
        eprintln!("{} {}", "error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Command::Inspect { path } => inspect(path),
        Command::Validate { path, features } => validate_saved(path, features),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

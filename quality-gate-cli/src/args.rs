//! Command-line arguments.
//!
//! Commands:
//! - quality-gate run --reference <csv> --current <csv> --schema <json>
//! - quality-gate freshness <path>
//! - quality-gate register --name <name> --description <text> --location <uri>
//! - quality-gate sample <input> <output>

use clap::{Parser, Subcommand, ValueEnum};
use quality_gate::config::ValidationMode;
use quality_gate::pipeline::freshness::DEFAULT_MAX_AGE_HOURS;
use quality_gate::pipeline::sampling::DEFAULT_SEED;
use std::path::PathBuf;

/// Schema validation and distribution drift checks for CSV datasets
#[derive(Parser, Debug)]
#[command(name = "quality-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate two datasets against a schema and compare their distributions
    Run(RunArgs),

    /// Check that a file was modified recently
    Freshness {
        /// File to check
        path: PathBuf,

        /// Maximum accepted age in hours
        #[arg(long, default_value_t = DEFAULT_MAX_AGE_HOURS)]
        max_age_hours: f64,
    },

    /// Add a dataset to the catalog
    Register {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Where the dataset is stored
        #[arg(long)]
        location: String,

        /// Catalog file (JSON Lines)
        #[arg(long, default_value = "data_catalog.jsonl")]
        catalog: PathBuf,
    },

    /// Write a reproducible random subset of a CSV file
    Sample {
        input: PathBuf,
        output: PathBuf,

        /// Share of rows to keep, in [0, 1]
        #[arg(long, default_value_t = 0.1)]
        fraction: f64,

        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Reference (baseline) CSV file
    #[arg(long)]
    pub reference: PathBuf,

    /// Current CSV file
    #[arg(long)]
    pub current: PathBuf,

    /// Schema JSON file
    #[arg(long)]
    pub schema: PathBuf,

    /// Gate configuration JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Significance threshold; overrides the config file
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Validation mode; overrides the config file
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Verdict output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Append lineage records to this JSON Lines file
    #[arg(long)]
    pub lineage_log: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    FailFast,
    AccumulateAll,
}

impl From<Mode> for ValidationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::FailFast => ValidationMode::FailFast,
            Mode::AccumulateAll => ValidationMode::AccumulateAll,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
    Markdown,
}

//! Command handlers. Each returns the process exit code.

use crate::args::{Command, OutputFormat, RunArgs};
use anyhow::{Context, Result};
use quality_gate::config::GateConfig;
use quality_gate::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, VerdictFormatter,
};
use quality_gate::gate::{QualityGate, QualityVerdict};
use quality_gate::pipeline::{check_freshness, sample, DataCatalog, JsonlLineageLog};
use quality_gate::schema::Schema;
use quality_gate::sources::{load_csv, write_csv, CsvOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILED: i32 = 1;

pub fn execute(command: Command) -> Result<i32> {
    match command {
        Command::Run(args) => run(args),
        Command::Freshness {
            path,
            max_age_hours,
        } => freshness(&path, max_age_hours),
        Command::Register {
            name,
            description,
            location,
            catalog,
        } => register(&catalog, &name, &description, &location),
        Command::Sample {
            input,
            output,
            fraction,
            seed,
        } => write_sample(&input, &output, fraction, seed),
    }
}

/// Builds the gate configuration: file first, then command-line overrides.
pub fn gate_config(args: &RunArgs) -> Result<GateConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GateConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GateConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config = config.with_significance_threshold(threshold);
    }
    if let Some(mode) = args.mode {
        config = config.with_validation_mode(mode.into());
    }
    config.validate()?;
    Ok(config)
}

fn run(args: RunArgs) -> Result<i32> {
    let config = gate_config(&args)?;

    let schema_json = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema {}", args.schema.display()))?;
    let schema = Schema::from_json(&schema_json)
        .with_context(|| format!("parsing schema {}", args.schema.display()))?;

    let options = CsvOptions::default();
    let reference = load_csv(&args.reference, &options)
        .with_context(|| format!("loading {}", args.reference.display()))?;
    let current = load_csv(&args.current, &options)
        .with_context(|| format!("loading {}", args.current.display()))?;

    let mut gate = QualityGate::new(config)?;
    if let Some(path) = &args.lineage_log {
        gate = gate.with_lineage(Arc::new(JsonlLineageLog::new(path)));
    }

    let verdict = gate.run(&reference, &current, &schema);
    println!("{}", render(&verdict, args.format)?);

    Ok(if verdict.is_pass() {
        EXIT_OK
    } else {
        EXIT_FAILED
    })
}

fn render(verdict: &QualityVerdict, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Json => JsonFormatter::new().format(verdict)?,
        OutputFormat::Human => {
            let config = FormatterConfig::default().with_colors(std::io::stdout().is_terminal());
            HumanFormatter::with_config(config).format(verdict)?
        }
        OutputFormat::Markdown => MarkdownFormatter::new().format(verdict)?,
    };
    Ok(output.trim_end().to_string())
}

fn freshness(path: &Path, max_age_hours: f64) -> Result<i32> {
    let report = check_freshness(path, max_age_hours)
        .with_context(|| format!("checking {}", path.display()))?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(if report.is_fresh {
        EXIT_OK
    } else {
        EXIT_FAILED
    })
}

fn register(catalog: &Path, name: &str, description: &str, location: &str) -> Result<i32> {
    let entry = DataCatalog::new(catalog).register(name, description, location)?;
    println!("{}", serde_json::to_string(&entry)?);
    Ok(EXIT_OK)
}

fn write_sample(input: &Path, output: &Path, fraction: f64, seed: u64) -> Result<i32> {
    let data = load_csv(input, &CsvOptions::default())
        .with_context(|| format!("loading {}", input.display()))?;
    let sampled = sample(&data, fraction, seed)?;
    write_csv(&sampled, output).with_context(|| format!("writing {}", output.display()))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = sampled.row_count(),
        at = %chrono::Utc::now().to_rfc3339(),
        "Wrote sample"
    );
    Ok(EXIT_OK)
}

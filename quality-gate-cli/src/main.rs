//! `quality-gate` command-line tool.
//!
//! Exit code 0 means the gate passed or the command succeeded. Anything else,
//! including errors, exits with 1.

mod args;
mod commands;

use anyhow::{anyhow, Result};
use args::{Cli, LogFormat};
use clap::Parser;
use quality_gate::logging::setup::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            commands::EXIT_FAILED
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let logging = LoggingConfig::default().with_json_format(cli.log_format == LogFormat::Json);
    init_logging(logging).map_err(|e| anyhow!("failed to initialise logging: {e}"))?;
    commands::execute(cli.command)
}

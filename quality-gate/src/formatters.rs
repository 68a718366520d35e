//! Verdict formatting for logs, consoles and reports.
//!
//! # Examples
//!
//! ```rust
//! use quality_gate::dataset::Dataset;
//! use quality_gate::formatters::{HumanFormatter, JsonFormatter, VerdictFormatter};
//! use quality_gate::gate::run_gate;
//! use quality_gate::schema::Schema;
//!
//! let data = Dataset::builder()
//!     .int_column("x", vec![1, 2, 3])
//!     .build()
//!     .unwrap();
//! let schema = Schema::builder("empty").build().unwrap();
//! let verdict = run_gate(&data, &data, &schema, 0.1).unwrap();
//!
//! let line = JsonFormatter::new().format(&verdict).unwrap();
//! assert!(line.contains("\"verdict_kind\":\"PASS\""));
//! println!("{}", HumanFormatter::new().format(&verdict).unwrap());
//! ```

use crate::drift::ColumnDrift;
use crate::gate::QualityVerdict;
use crate::prelude::*;
use crate::schema::{ValidationResult, Violation};
use std::fmt::Write;

/// Controls what a formatter includes.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// List individual schema violations
    pub include_violations: bool,
    /// List every tested column, not only the drifted ones
    pub include_drift_details: bool,
    /// List columns the drift detector skipped
    pub include_skipped: bool,
    /// Maximum violations shown per dataset; `None` shows all
    pub max_violations: Option<usize>,
    /// ANSI colours (human formatter only)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_violations: true,
            include_drift_details: false,
            include_skipped: true,
            max_violations: None,
            use_colors: true,
        }
    }
}

impl FormatterConfig {
    /// Verdict and counts only.
    pub fn minimal() -> Self {
        Self {
            include_violations: false,
            include_drift_details: false,
            include_skipped: false,
            max_violations: Some(0),
            use_colors: false,
        }
    }

    pub fn detailed() -> Self {
        Self {
            include_violations: true,
            include_drift_details: true,
            include_skipped: true,
            max_violations: None,
            use_colors: true,
        }
    }

    /// No colours and bounded output.
    pub fn ci() -> Self {
        Self {
            include_violations: true,
            include_drift_details: false,
            include_skipped: true,
            max_violations: Some(50),
            use_colors: false,
        }
    }

    pub fn with_violations(mut self, include: bool) -> Self {
        self.include_violations = include;
        self
    }

    pub fn with_drift_details(mut self, include: bool) -> Self {
        self.include_drift_details = include;
        self
    }

    pub fn with_max_violations(mut self, max: Option<usize>) -> Self {
        self.max_violations = max;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn shown<'a>(&self, violations: &'a [Violation]) -> &'a [Violation] {
        if !self.include_violations {
            return &[];
        }
        match self.max_violations {
            Some(max) => &violations[..max.min(violations.len())],
            None => violations,
        }
    }
}

/// Renders a [`QualityVerdict`] as text.
///
/// ```rust
/// use quality_gate::formatters::VerdictFormatter;
/// use quality_gate::gate::QualityVerdict;
/// use quality_gate::prelude::Result;
///
/// struct Oneliner;
///
/// impl VerdictFormatter for Oneliner {
///     fn format(&self, verdict: &QualityVerdict) -> Result<String> {
///         Ok(verdict.verdict_kind.to_string())
///     }
/// }
/// ```
pub trait VerdictFormatter {
    fn format(&self, verdict: &QualityVerdict) -> Result<String>;

    /// Formats with an explicit configuration. The default ignores it.
    fn format_with_config(
        &self,
        verdict: &QualityVerdict,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(verdict)
    }
}

fn render(f: impl FnOnce(&mut String) -> std::fmt::Result) -> Result<String> {
    let mut output = String::new();
    f(&mut output).map_err(|e| GateError::Internal(format!("failed to format verdict: {e}")))?;
    Ok(output)
}

/// Serializes verdicts as JSON, one line by default.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::detailed(),
            pretty: false,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl VerdictFormatter for JsonFormatter {
    fn format(&self, verdict: &QualityVerdict) -> Result<String> {
        self.format_with_config(verdict, &self.config)
    }

    fn format_with_config(
        &self,
        verdict: &QualityVerdict,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered = filter_verdict(verdict, config);
        if self.pretty {
            Ok(serde_json::to_string_pretty(&filtered)?)
        } else {
            filtered.to_json_line()
        }
    }
}

/// Console output.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl VerdictFormatter for HumanFormatter {
    fn format(&self, verdict: &QualityVerdict) -> Result<String> {
        self.format_with_config(verdict, &self.config)
    }

    fn format_with_config(
        &self,
        verdict: &QualityVerdict,
        config: &FormatterConfig,
    ) -> Result<String> {
        let paint = |text: &str, code: &str| {
            if config.use_colors {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        render(|out| {
            writeln!(out)?;
            if verdict.is_pass() {
                writeln!(out, "✅ {} ({})", paint("Quality gate PASSED", "32"), verdict.verdict_kind)?;
            } else {
                writeln!(out, "❌ {} ({})", paint("Quality gate FAILED", "31"), verdict.verdict_kind)?;
            }

            writeln!(out)?;
            writeln!(out, "📋 Schema:")?;
            for (side, result) in sides(verdict) {
                let status = if result.is_pass() {
                    paint("passed", "32")
                } else {
                    paint(&format!("failed ({} violations)", result.violations.len()), "31")
                };
                writeln!(out, "   {side}: {status}")?;
                let shown = config.shown(&result.violations);
                for (i, violation) in shown.iter().enumerate() {
                    writeln!(out, "      🚨 #{} {}", i + 1, violation.message())?;
                }
                if config.include_violations && result.violations.len() > shown.len() {
                    writeln!(
                        out,
                        "      ... and {} more violations",
                        result.violations.len() - shown.len()
                    )?;
                }
            }

            writeln!(out)?;
            writeln!(out, "📉 Drift (threshold {}):", verdict.significance_threshold)?;
            writeln!(
                out,
                "   Tested: {}, Drifted: {}, Skipped: {}",
                verdict.tested_columns.len(),
                verdict.drifted_columns.len(),
                verdict.skipped_columns.len()
            )?;
            let listed = if config.include_drift_details {
                &verdict.tested_columns
            } else {
                &verdict.drifted_columns
            };
            for column in listed {
                let drifted = column.p_value < verdict.significance_threshold;
                let marker = if drifted { paint("drifted", "33") } else { "stable".to_string() };
                writeln!(out, "   {} {marker}", describe_drift(column))?;
            }
            if config.include_skipped {
                for skipped in &verdict.skipped_columns {
                    writeln!(out, "   ⏭️  {} skipped ({})", skipped.name, skipped.reason)?;
                }
            }
            writeln!(out)
        })
    }
}

/// Markdown report.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl VerdictFormatter for MarkdownFormatter {
    fn format(&self, verdict: &QualityVerdict) -> Result<String> {
        self.format_with_config(verdict, &self.config)
    }

    fn format_with_config(
        &self,
        verdict: &QualityVerdict,
        config: &FormatterConfig,
    ) -> Result<String> {
        let h = "#".repeat(self.heading_level as usize);
        render(|out| {
            let icon = if verdict.is_pass() { "✅" } else { "❌" };
            writeln!(out, "{h} {icon} Quality Gate - {}", verdict.verdict_kind)?;
            writeln!(out)?;
            writeln!(out, "| Dimension | Result |")?;
            writeln!(out, "|-----------|--------|")?;
            for (side, result) in sides(verdict) {
                writeln!(
                    out,
                    "| {side} schema | {} |",
                    if result.is_pass() { "passed" } else { "failed" }
                )?;
            }
            writeln!(
                out,
                "| Drifted columns | {} of {} |",
                verdict.drifted_columns.len(),
                verdict.tested_columns.len()
            )?;
            writeln!(out, "| Significance threshold | {} |", verdict.significance_threshold)?;

            let any_violations = sides(verdict)
                .iter()
                .any(|(_, r)| !config.shown(&r.violations).is_empty());
            if any_violations {
                writeln!(out)?;
                writeln!(out, "{h}# Violations")?;
                writeln!(out)?;
                writeln!(out, "| Dataset | Column | Kind | Expected | Row | Value | Count |")?;
                writeln!(out, "|---------|--------|------|----------|-----|-------|-------|")?;
                for (side, result) in sides(verdict) {
                    for v in config.shown(&result.violations) {
                        writeln!(
                            out,
                            "| {side} | {} | {} | {} | {} | {} | {} |",
                            v.column,
                            v.kind,
                            v.expected,
                            v.row.map(|r| r.to_string()).unwrap_or_default(),
                            v.value.as_ref().map(|x| x.to_string()).unwrap_or_default(),
                            v.failure_count
                        )?;
                    }
                }
            }

            let listed = if config.include_drift_details {
                &verdict.tested_columns
            } else {
                &verdict.drifted_columns
            };
            if !listed.is_empty() {
                writeln!(out)?;
                writeln!(out, "{h}# Drift")?;
                writeln!(out)?;
                writeln!(out, "| Column | Statistic | p-value |")?;
                writeln!(out, "|--------|-----------|---------|")?;
                for c in listed {
                    writeln!(out, "| {} | {:.4} | {:.4e} |", c.name, c.statistic, c.p_value)?;
                }
            }

            if config.include_skipped && !verdict.skipped_columns.is_empty() {
                writeln!(out)?;
                let names: Vec<String> = verdict
                    .skipped_columns
                    .iter()
                    .map(|s| format!("`{}` ({})", s.name, s.reason))
                    .collect();
                writeln!(out, "> **Skipped:** {}", names.join(", "))?;
            }
            Ok(())
        })
    }
}

fn sides(verdict: &QualityVerdict) -> [(&'static str, &ValidationResult); 2] {
    [
        ("reference", &verdict.reference_validation),
        ("current", &verdict.current_validation),
    ]
}

fn describe_drift(column: &ColumnDrift) -> String {
    format!(
        "{}: D={:.4}, p={:.4e}",
        column.name, column.statistic, column.p_value
    )
}

/// Applies the config to a copy of the verdict. The verdict kind is never
/// changed.
fn filter_verdict(verdict: &QualityVerdict, config: &FormatterConfig) -> QualityVerdict {
    let mut filtered = verdict.clone();
    for result in [
        &mut filtered.reference_validation,
        &mut filtered.current_validation,
    ] {
        let keep = config.shown(&result.violations).len();
        result.violations.truncate(keep);
    }
    if !config.include_drift_details {
        filtered.tested_columns.clear();
    }
    if !config.include_skipped {
        filtered.skipped_columns.clear();
    }
    filtered
}

//! Per-column distribution drift between a reference and a current dataset.
//!
//! Every column present in both datasets is compared with a two-sample
//! Kolmogorov-Smirnov test. A column is reported as drifted iff its p-value is
//! strictly below the significance threshold.
//!
//! Columns are skipped, not errored, when:
//!
//! - either side is text (or mixed): KS needs ordinal data
//! - either side has fewer than `min_samples` non-NaN values
//!
//! Columns that exist on one side only are ignored entirely.
//!
//! # Examples
//!
//! ```rust
//! use quality_gate::dataset::Dataset;
//! use quality_gate::drift::detect_drift;
//!
//! let reference = Dataset::builder()
//!     .int_column("feature1", (0..100).collect())
//!     .build()
//!     .unwrap();
//! let current = Dataset::builder()
//!     .int_column("feature1", (1000..1100).collect())
//!     .build()
//!     .unwrap();
//!
//! let report = detect_drift(&reference, &current, 0.1).unwrap();
//! assert!(report.is_drifted("feature1"));
//! ```

pub mod ks;

use crate::config::{GateConfig, KsMethod, DEFAULT_MIN_SAMPLES, DEFAULT_SIGNIFICANCE_THRESHOLD};
use crate::dataset::{ColumnData, Dataset};
use crate::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// KS result for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub name: String,
    pub statistic: f64,
    pub p_value: f64,
}

/// Why a shared column was not tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Text or mixed values on at least one side
    NonNumeric,
    /// Fewer than `min_samples` usable values on at least one side
    InsufficientSamples,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NonNumeric => f.write_str("non_numeric"),
            SkipReason::InsufficientSamples => f.write_str("insufficient_samples"),
        }
    }
}

/// A shared column that was not tested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedColumn {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of drift detection across a dataset pair.
///
/// All column lists follow the reference dataset's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub significance_threshold: f64,
    /// Columns with `p_value < significance_threshold`
    pub drifted_columns: Vec<ColumnDrift>,
    /// Every column that was tested, drifted or not
    pub tested_columns: Vec<ColumnDrift>,
    pub skipped_columns: Vec<SkippedColumn>,
}

impl DriftReport {
    /// True when no column drifted.
    pub fn is_stable(&self) -> bool {
        self.drifted_columns.is_empty()
    }

    pub fn is_drifted(&self, column: &str) -> bool {
        self.drifted_columns.iter().any(|c| c.name == column)
    }

    /// KS result for a tested column.
    pub fn column(&self, name: &str) -> Option<&ColumnDrift> {
        self.tested_columns.iter().find(|c| c.name == name)
    }

    pub fn skipped(&self, name: &str) -> Option<SkipReason> {
        self.skipped_columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.reason)
    }
}

enum ColumnOutcome {
    Tested(ColumnDrift),
    Skipped(SkippedColumn),
}

/// Compares column distributions between two datasets.
#[derive(Debug, Clone)]
pub struct DriftDetector {
    significance_threshold: f64,
    method: KsMethod,
    min_samples: usize,
    parallel: bool,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self {
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            method: KsMethod::Auto,
            min_samples: DEFAULT_MIN_SAMPLES,
            parallel: true,
        }
    }
}

impl DriftDetector {
    /// Creates a detector, rejecting thresholds outside `(0, 1]`.
    pub fn new(significance_threshold: f64) -> Result<Self> {
        Self::from_config(
            &GateConfig::default().with_significance_threshold(significance_threshold),
        )
    }

    pub fn from_config(config: &GateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    /// Builds a detector from an already validated config.
    pub(crate) fn from_parts(config: &GateConfig) -> Self {
        Self {
            significance_threshold: config.significance_threshold,
            method: config.ks_method,
            min_samples: config.min_samples,
            parallel: config.parallel,
        }
    }

    pub fn significance_threshold(&self) -> f64 {
        self.significance_threshold
    }

    /// Tests every column shared by `reference` and `current`.
    #[instrument(skip_all, fields(
        reference.columns = reference.column_count(),
        current.columns = current.column_count(),
        threshold = self.significance_threshold,
        method = ?self.method
    ))]
    pub fn detect(&self, reference: &Dataset, current: &Dataset) -> DriftReport {
        let pairs: Vec<(&str, &ColumnData, &ColumnData)> = reference
            .columns()
            .iter()
            .filter_map(|r| {
                current
                    .column(r.name())
                    .map(|c| (r.name(), r.data(), c.data()))
            })
            .collect();

        let outcomes: Vec<ColumnOutcome> = if self.parallel && pairs.len() > 1 {
            pairs
                .par_iter()
                .map(|(name, r, c)| self.compare(name, r, c))
                .collect()
        } else {
            pairs
                .iter()
                .map(|(name, r, c)| self.compare(name, r, c))
                .collect()
        };

        let mut tested_columns = Vec::new();
        let mut skipped_columns = Vec::new();
        for outcome in outcomes {
            match outcome {
                ColumnOutcome::Tested(drift) => tested_columns.push(drift),
                ColumnOutcome::Skipped(skip) => skipped_columns.push(skip),
            }
        }

        let drifted_columns: Vec<ColumnDrift> = tested_columns
            .iter()
            .filter(|c| c.p_value < self.significance_threshold)
            .cloned()
            .collect();

        info!(
            shared = pairs.len(),
            tested = tested_columns.len(),
            skipped = skipped_columns.len(),
            drifted = drifted_columns.len(),
            "Drift detection completed"
        );

        DriftReport {
            significance_threshold: self.significance_threshold,
            drifted_columns,
            tested_columns,
            skipped_columns,
        }
    }

    fn compare(&self, name: &str, reference: &ColumnData, current: &ColumnData) -> ColumnOutcome {
        let skip = |reason: SkipReason| {
            debug!(column = name, %reason, "Skipping drift test");
            ColumnOutcome::Skipped(SkippedColumn {
                name: name.to_string(),
                reason,
            })
        };

        let (Some(mut a), Some(mut b)) = (reference.as_f64_vec(), current.as_f64_vec()) else {
            return skip(SkipReason::NonNumeric);
        };
        a.retain(|v| !v.is_nan());
        b.retain(|v| !v.is_nan());
        if a.len() < self.min_samples || b.len() < self.min_samples {
            return skip(SkipReason::InsufficientSamples);
        }

        let outcome = ks::ks_2samp(&a, &b, self.method);
        debug!(
            column = name,
            reference.size = a.len(),
            current.size = b.len(),
            statistic = outcome.statistic,
            p_value = outcome.p_value,
            "KS test"
        );
        ColumnOutcome::Tested(ColumnDrift {
            name: name.to_string(),
            statistic: outcome.statistic,
            p_value: outcome.p_value,
        })
    }
}

/// Detects drift with the given threshold and default settings otherwise.
pub fn detect_drift(
    reference: &Dataset,
    current: &Dataset,
    significance_threshold: f64,
) -> Result<DriftReport> {
    Ok(DriftDetector::new(significance_threshold)?.detect(reference, current))
}

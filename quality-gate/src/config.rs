//! Gate configuration.
//!
//! [`GateConfig`] collects every knob the validator, the drift detector and
//! the gate expose. It deserializes from JSON with every field optional, so a
//! config file only needs to name what it changes:
//!
//! ```rust
//! use quality_gate::config::{GateConfig, ValidationMode};
//!
//! let config: GateConfig =
//!     serde_json::from_str(r#"{"significance_threshold": 0.05, "validation_mode": "accumulate_all"}"#)
//!         .unwrap();
//! assert_eq!(config.validation_mode, ValidationMode::AccumulateAll);
//! assert_eq!(config.min_samples, 2);
//! config.validate().unwrap();
//! ```

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Default p-value cutoff below which a column is reported as drifted.
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.1;

/// Default minimum number of values required on each side of a KS test.
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// How many violations the schema validator reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first violation in column, check, row order
    #[default]
    FailFast,
    /// Report every failing column and check
    AccumulateAll,
}

/// How the KS p-value is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KsMethod {
    /// Exact for small samples, asymptotic otherwise
    #[default]
    Auto,
    /// Exact lattice-path probability
    Exact,
    /// Limiting Kolmogorov distribution
    Asymptotic,
}

/// Configuration for a quality gate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// p-value cutoff; a column drifts iff `p_value < significance_threshold`
    pub significance_threshold: f64,
    /// Fail-fast or accumulate-all schema validation
    pub validation_mode: ValidationMode,
    /// KS p-value method
    pub ks_method: KsMethod,
    /// Columns with fewer values than this on either side are skipped
    pub min_samples: usize,
    /// Run per-column KS tests on the rayon pool
    pub parallel: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            validation_mode: ValidationMode::FailFast,
            ks_method: KsMethod::Auto,
            min_samples: DEFAULT_MIN_SAMPLES,
            parallel: true,
        }
    }
}

impl GateConfig {
    /// Full diagnostics and a tighter significance level.
    pub fn strict() -> Self {
        Self {
            significance_threshold: 0.05,
            validation_mode: ValidationMode::AccumulateAll,
            ..Self::default()
        }
    }

    /// Only flags very pronounced drift.
    pub fn lenient() -> Self {
        Self {
            significance_threshold: 0.01,
            ..Self::default()
        }
    }

    /// Loads a config from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GateConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_significance_threshold(mut self, threshold: f64) -> Self {
        self.significance_threshold = threshold;
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn with_ks_method(mut self, method: KsMethod) -> Self {
        self.ks_method = method;
        self
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the contract preconditions.
    pub fn validate(&self) -> Result<()> {
        let t = self.significance_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(GateError::Configuration(format!(
                "significance_threshold must be in (0, 1], got {t}"
            )));
        }
        if self.min_samples < 1 {
            return Err(GateError::Configuration(
                "min_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

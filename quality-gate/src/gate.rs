//! The quality gate: schema validation of both datasets plus drift detection
//! between them, merged into one verdict.
//!
//! The three sub-checks never short-circuit each other, so a verdict always
//! carries both validation results and the full drift report.
//!
//! # Examples
//!
//! ```rust
//! use quality_gate::dataset::{Dataset, ValueType};
//! use quality_gate::gate::{run_gate, VerdictKind};
//! use quality_gate::schema::{Check, ColumnConstraint, Schema};
//!
//! let schema = Schema::builder("features")
//!     .column(ColumnConstraint::new("feature1", ValueType::Int).check(Check::non_negative()))
//!     .build()
//!     .unwrap();
//! let reference = Dataset::builder()
//!     .int_column("feature1", (0..100).collect())
//!     .build()
//!     .unwrap();
//! let current = Dataset::builder()
//!     .int_column("feature1", (1000..1100).collect())
//!     .build()
//!     .unwrap();
//!
//! let verdict = run_gate(&reference, &current, &schema, 0.1).unwrap();
//! assert_eq!(verdict.verdict_kind, VerdictKind::DriftFail);
//! println!("{}", verdict.to_json_line().unwrap());
//! ```

use crate::config::GateConfig;
use crate::dataset::Dataset;
use crate::drift::{ColumnDrift, DriftDetector, DriftReport, SkippedColumn};
use crate::log_column;
use crate::logging::{truncate_field, LogConfig};
use crate::pipeline::lineage::{DatasetRole, LineageRecord, LineageSink};
use crate::prelude::*;
use crate::schema::{Schema, SchemaValidator, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn, Level};

/// Which dimensions of a gate run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    Pass,
    SchemaFail,
    DriftFail,
    SchemaAndDriftFail,
}

impl VerdictKind {
    pub fn from_outcomes(schema_passed: bool, drift_free: bool) -> Self {
        match (schema_passed, drift_free) {
            (true, true) => VerdictKind::Pass,
            (false, true) => VerdictKind::SchemaFail,
            (true, false) => VerdictKind::DriftFail,
            (false, false) => VerdictKind::SchemaAndDriftFail,
        }
    }

    pub fn is_pass(self) -> bool {
        self == VerdictKind::Pass
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VerdictKind::Pass => "PASS",
            VerdictKind::SchemaFail => "SCHEMA_FAIL",
            VerdictKind::DriftFail => "DRIFT_FAIL",
            VerdictKind::SchemaAndDriftFail => "SCHEMA_AND_DRIFT_FAIL",
        }
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one gate run.
///
/// Contains nothing time- or run-dependent, so identical inputs produce
/// identical verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityVerdict {
    pub verdict_kind: VerdictKind,
    pub reference_validation: ValidationResult,
    pub current_validation: ValidationResult,
    pub drifted_columns: Vec<ColumnDrift>,
    pub tested_columns: Vec<ColumnDrift>,
    pub skipped_columns: Vec<SkippedColumn>,
    pub significance_threshold: f64,
}

impl QualityVerdict {
    pub fn new(
        reference_validation: ValidationResult,
        current_validation: ValidationResult,
        drift: DriftReport,
    ) -> Self {
        let verdict_kind = VerdictKind::from_outcomes(
            reference_validation.is_pass() && current_validation.is_pass(),
            drift.is_stable(),
        );
        Self {
            verdict_kind,
            reference_validation,
            current_validation,
            drifted_columns: drift.drifted_columns,
            tested_columns: drift.tested_columns,
            skipped_columns: drift.skipped_columns,
            significance_threshold: drift.significance_threshold,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.verdict_kind.is_pass()
    }

    pub fn schema_passed(&self) -> bool {
        self.reference_validation.is_pass() && self.current_validation.is_pass()
    }

    pub fn has_drift(&self) -> bool {
        !self.drifted_columns.is_empty()
    }

    /// Serializes the verdict as a single JSON line, without a trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Runs schema validation and drift detection for dataset pairs.
#[derive(Clone)]
pub struct QualityGate {
    config: GateConfig,
    log_config: LogConfig,
    lineage: Option<Arc<dyn LineageSink>>,
}

impl fmt::Debug for QualityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityGate")
            .field("config", &self.config)
            .field("log_config", &self.log_config)
            .field("lineage", &self.lineage.is_some())
            .finish()
    }
}

impl QualityGate {
    /// Creates a gate, validating the configuration.
    pub fn new(config: GateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            log_config: LogConfig::default(),
            lineage: None,
        })
    }

    /// Hands one [`LineageRecord`] per examined dataset to `sink`.
    pub fn with_lineage(mut self, sink: Arc<dyn LineageSink>) -> Self {
        self.lineage = Some(sink);
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Validates both datasets and compares their distributions.
    ///
    /// Data problems only ever show up in the verdict. Lineage sink failures
    /// are logged and do not affect it.
    #[instrument(skip_all, fields(
        schema.name = %schema.name(),
        reference.rows = reference.row_count(),
        current.rows = current.row_count(),
        threshold = self.config.significance_threshold
    ))]
    pub fn run(&self, reference: &Dataset, current: &Dataset, schema: &Schema) -> QualityVerdict {
        let validator = SchemaValidator::new(self.config.validation_mode);
        let reference_validation = validator.validate(reference, schema);
        let current_validation = validator.validate(current, schema);

        let detector = DriftDetector::from_parts(&self.config);
        let drift = detector.detect(reference, current);

        let verdict = QualityVerdict::new(reference_validation, current_validation, drift);
        self.log_details(&verdict);
        self.log_summary(&verdict);

        if let Some(sink) = &self.lineage {
            self.hand_off(sink.as_ref(), reference, DatasetRole::Reference);
            self.hand_off(sink.as_ref(), current, DatasetRole::Current);
        }

        verdict
    }

    fn hand_off(&self, sink: &dyn LineageSink, dataset: &Dataset, role: DatasetRole) {
        let record = LineageRecord::for_dataset(dataset, role);
        match sink.record(&record) {
            Ok(()) => {
                if self.log_config.log_lineage {
                    info!(origin = %record.origin, role = ?role, rows = record.num_rows, "Lineage recorded");
                }
            }
            Err(e) => warn!(origin = %record.origin, role = ?role, error = %e, "Failed to record lineage"),
        }
    }

    /// Summary event at the configured base level. Below INFO only failing
    /// verdicts are reported.
    fn log_summary(&self, verdict: &QualityVerdict) {
        macro_rules! summary {
            ($level:ident) => {
                $level!(
                    verdict = %verdict.verdict_kind,
                    reference.violations = verdict.reference_validation.violations.len(),
                    current.violations = verdict.current_validation.violations.len(),
                    drifted = verdict.drifted_columns.len(),
                    "Quality gate finished"
                )
            };
        }

        let level = self.log_config.base_level;
        if level == Level::TRACE || level == Level::DEBUG {
            summary!(debug);
        } else if level == Level::INFO {
            summary!(info);
        } else if !verdict.is_pass() {
            summary!(warn);
        }
    }

    fn log_details(&self, verdict: &QualityVerdict) {
        let max = self.log_config.max_field_length;
        for (side, result) in [
            ("reference", &verdict.reference_validation),
            ("current", &verdict.current_validation),
        ] {
            for violation in &result.violations {
                log_column!(
                    self.log_config,
                    side,
                    detail = %truncate_field(&violation.message(), max),
                    "Violation"
                );
            }
        }
        for column in &verdict.drifted_columns {
            log_column!(
                self.log_config,
                column = %column.name,
                statistic = column.statistic,
                p_value = column.p_value,
                "Drifted column"
            );
        }
    }
}

/// Runs the gate with default settings and the given significance threshold.
///
/// Fails only when the threshold lies outside `(0, 1]`.
pub fn run_gate(
    reference: &Dataset,
    current: &Dataset,
    schema: &Schema,
    significance_threshold: f64,
) -> Result<QualityVerdict> {
    let config = GateConfig::default().with_significance_threshold(significance_threshold);
    Ok(QualityGate::new(config)?.run(reference, current, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lineage::MemoryLineageLog;
    use crate::schema::ViolationKind;
    use crate::test_fixtures::{employee_schema, employees, shifted_employees};

    struct FailingSink;

    impl LineageSink for FailingSink {
        fn record(&self, _record: &LineageRecord) -> Result<()> {
            Err(GateError::Internal("sink offline".to_string()))
        }
    }

    fn bad_age() -> Dataset {
        Dataset::builder()
            .int_column("age", vec![150, 30, 40])
            .float_column("salary", vec![50000.0, 75000.0, 60000.0])
            .text_column("country", vec!["US", "UK", "IN"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_verdict_kind_table() {
        assert_eq!(VerdictKind::from_outcomes(true, true), VerdictKind::Pass);
        assert_eq!(VerdictKind::from_outcomes(false, true), VerdictKind::SchemaFail);
        assert_eq!(VerdictKind::from_outcomes(true, false), VerdictKind::DriftFail);
        assert_eq!(
            VerdictKind::from_outcomes(false, false),
            VerdictKind::SchemaAndDriftFail
        );
        assert_eq!(
            serde_json::to_string(&VerdictKind::SchemaAndDriftFail).unwrap(),
            "\"SCHEMA_AND_DRIFT_FAIL\""
        );
    }

    #[test]
    fn test_pass() {
        let verdict = run_gate(&employees(), &employees(), &employee_schema(), 0.1).unwrap();
        assert!(verdict.is_pass());
        assert!(verdict.schema_passed());
        assert!(!verdict.has_drift());
        assert_eq!(verdict.tested_columns.len(), 2);
    }

    #[test]
    fn test_schema_failure_on_current_side() {
        let verdict = run_gate(&employees(), &bad_age(), &employee_schema(), 0.1).unwrap();
        assert_eq!(verdict.verdict_kind, VerdictKind::SchemaFail);
        assert!(verdict.reference_validation.is_pass());
        let violation = verdict.current_validation.first_violation().unwrap();
        assert_eq!(violation.kind, ViolationKind::ConstraintViolation);
        assert_eq!(violation.column, "age");
    }

    #[test]
    fn test_drift_failure() {
        let verdict =
            run_gate(&employees(), &shifted_employees(), &employee_schema(), 0.2).unwrap();
        assert_eq!(verdict.verdict_kind, VerdictKind::DriftFail);
        assert!(verdict.drifted_columns.iter().any(|c| c.name == "salary"));
    }

    #[test]
    fn test_schema_failure_does_not_suppress_drift() {
        let schema = Schema::builder("needs_id")
            .column(crate::schema::ColumnConstraint::new(
                "id",
                crate::dataset::ValueType::Int,
            ))
            .build()
            .unwrap();
        let verdict = run_gate(&employees(), &shifted_employees(), &schema, 0.2).unwrap();
        assert_eq!(verdict.verdict_kind, VerdictKind::SchemaAndDriftFail);
        assert_eq!(
            verdict.reference_validation.violations[0].kind,
            ViolationKind::MissingColumn
        );
        assert!(verdict.has_drift());
    }

    #[test]
    fn test_json_line_shape() {
        let verdict = run_gate(&employees(), &bad_age(), &employee_schema(), 0.1).unwrap();
        let line = verdict.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["verdict_kind"], "SCHEMA_FAIL");
        assert_eq!(json["reference_validation"]["passed"], true);
        assert_eq!(json["current_validation"]["violations"][0]["value"], 150);
        assert!(json["drifted_columns"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_repeated_runs_identical() {
        let gate = QualityGate::new(GateConfig::strict()).unwrap();
        let first = gate.run(&employees(), &shifted_employees(), &employee_schema());
        let second = gate.run(&employees(), &shifted_employees(), &employee_schema());
        assert_eq!(first.to_json_line().unwrap(), second.to_json_line().unwrap());
    }

    #[test]
    fn test_lineage_one_record_per_dataset() {
        let sink = Arc::new(MemoryLineageLog::new());
        let gate = QualityGate::new(GateConfig::default())
            .unwrap()
            .with_lineage(sink.clone());
        gate.run(
            &employees().with_origin("ref.csv"),
            &employees().with_origin("cur.csv"),
            &employee_schema(),
        );

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].origin, "ref.csv");
        assert_eq!(records[0].role, DatasetRole::Reference);
        assert_eq!(records[1].origin, "cur.csv");
        assert_eq!(records[1].num_rows, 3);
    }

    #[test]
    fn test_lineage_failure_keeps_verdict() {
        let gate = QualityGate::new(GateConfig::default())
            .unwrap()
            .with_lineage(Arc::new(FailingSink))
            .with_log_config(LogConfig::verbose());
        let verdict = gate.run(&employees(), &employees(), &employee_schema());
        assert!(verdict.is_pass());
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(
            run_gate(&employees(), &employees(), &employee_schema(), 1.5),
            Err(GateError::Configuration(_))
        ));
    }
}

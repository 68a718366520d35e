//! Validation result types.

use crate::dataset::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// A schema-declared column is absent from the dataset
    MissingColumn,
    /// A column's values are not of the declared type
    TypeMismatch,
    /// A value failed a declared check
    ConstraintViolation,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationKind::MissingColumn => "MISSING_COLUMN",
            ViolationKind::TypeMismatch => "TYPE_MISMATCH",
            ViolationKind::ConstraintViolation => "CONSTRAINT_VIOLATION",
        };
        f.write_str(s)
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub column: String,
    pub kind: ViolationKind,
    /// Name of the failing check (`in_range`, `not_null`, ...); absent for
    /// missing columns and type mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// The condition that was expected to hold
    pub expected: String,
    /// First offending row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// First offending value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// How many rows failed the same rule
    pub failure_count: usize,
}

impl Violation {
    pub(crate) fn missing_column(column: &str) -> Self {
        Self {
            column: column.to_string(),
            kind: ViolationKind::MissingColumn,
            check: None,
            expected: "column present".to_string(),
            row: None,
            value: None,
            failure_count: 0,
        }
    }

    pub(crate) fn type_mismatch(
        column: &str,
        expected: ValueType,
        row: Option<usize>,
        value: Option<Value>,
        failure_count: usize,
    ) -> Self {
        Self {
            column: column.to_string(),
            kind: ViolationKind::TypeMismatch,
            check: None,
            expected: format!("type {expected}"),
            row,
            value,
            failure_count,
        }
    }

    pub(crate) fn constraint(
        column: &str,
        check: &str,
        expected: String,
        row: usize,
        value: Value,
        failure_count: usize,
    ) -> Self {
        Self {
            column: column.to_string(),
            kind: ViolationKind::ConstraintViolation,
            check: Some(check.to_string()),
            expected,
            row: Some(row),
            value: Some(value),
            failure_count,
        }
    }

    /// One-line description for logs and console output.
    pub fn message(&self) -> String {
        let mut msg = format!("{} on '{}': expected {}", self.kind, self.column, self.expected);
        if let Some(value) = &self.value {
            msg.push_str(&format!(", found {value}"));
        }
        if let Some(row) = self.row {
            msg.push_str(&format!(" at row {row}"));
        }
        if self.failure_count > 1 {
            msg.push_str(&format!(" ({} rows failed)", self.failure_count));
        }
        msg
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Outcome of validating one dataset against a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.passed
    }

    pub fn is_failure(&self) -> bool {
        !self.passed
    }

    /// The first violation in validation order.
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }

    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

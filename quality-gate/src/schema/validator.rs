//! The schema validator.
//!
//! Columns are visited in schema declaration order. For each column the rules
//! run in a fixed order, and within a rule rows are scanned in order:
//!
//! 1. presence (`MISSING_COLUMN`)
//! 2. type (`TYPE_MISMATCH`); a mismatch skips the remaining rules
//! 3. nullability (`CONSTRAINT_VIOLATION` with check `not_null`)
//! 4. declared checks, in declaration order (`CONSTRAINT_VIOLATION`)
//!
//! In [`ValidationMode::FailFast`] the first violation in that order is the
//! only one reported. In [`ValidationMode::AccumulateAll`] every failing rule
//! is reported once, carrying its first offending row and failure count.

use super::{ColumnConstraint, Schema, ValidationResult, Violation};
use crate::config::ValidationMode;
use crate::dataset::{ColumnData, Dataset, ValueRef};
use crate::logging::truncate_field;
use tracing::{debug, instrument};

const MAX_LOGGED_VALUE: usize = 64;

/// Validates datasets against schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    mode: ValidationMode,
}

impl SchemaValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validates `dataset` against `schema`.
    ///
    /// Columns present in the dataset but not declared in the schema are
    /// ignored. This never fails: every finding is part of the result.
    #[instrument(skip_all, fields(
        schema.name = %schema.name(),
        schema.columns = schema.len(),
        dataset.rows = dataset.row_count(),
        mode = ?self.mode
    ))]
    pub fn validate(&self, dataset: &Dataset, schema: &Schema) -> ValidationResult {
        let mut violations = Vec::new();

        for constraint in schema.columns() {
            self.check_column(dataset, constraint, &mut violations);
            if self.mode == ValidationMode::FailFast && !violations.is_empty() {
                break;
            }
        }

        for violation in &violations {
            debug!(
                column = %violation.column,
                kind = %violation.kind,
                check = ?violation.check,
                row = ?violation.row,
                value = %violation
                    .value
                    .as_ref()
                    .map(|v| truncate_field(&v.to_string(), MAX_LOGGED_VALUE))
                    .unwrap_or_default(),
                failures = violation.failure_count,
                "Schema violation"
            );
        }

        ValidationResult::from_violations(violations)
    }

    fn check_column(
        &self,
        dataset: &Dataset,
        constraint: &ColumnConstraint,
        out: &mut Vec<Violation>,
    ) {
        let Some(column) = dataset.column(&constraint.name) else {
            out.push(Violation::missing_column(&constraint.name));
            return;
        };
        let data = column.data();

        if let Some(violation) = type_violation(constraint, data) {
            out.push(violation);
            return;
        }

        if !constraint.nullable {
            if let Some(violation) = null_violation(constraint, data) {
                out.push(violation);
                if self.mode == ValidationMode::FailFast {
                    return;
                }
            }
        }

        for check in &constraint.checks {
            let mut failing = data
                .cells()
                .enumerate()
                .filter(|(_, cell)| !is_missing(cell))
                .filter(|(_, cell)| !check.holds(*cell));

            if let Some((row, cell)) = failing.next() {
                let failure_count = 1 + failing.count();
                out.push(Violation::constraint(
                    &constraint.name,
                    check.name(),
                    check.describe(),
                    row,
                    cell.to_value(),
                    failure_count,
                ));
                if self.mode == ValidationMode::FailFast {
                    return;
                }
            }
        }
    }
}

/// Validates with the default fail-fast policy.
pub fn validate(dataset: &Dataset, schema: &Schema) -> ValidationResult {
    SchemaValidator::default().validate(dataset, schema)
}

pub fn validate_with_mode(
    dataset: &Dataset,
    schema: &Schema,
    mode: ValidationMode,
) -> ValidationResult {
    SchemaValidator::new(mode).validate(dataset, schema)
}

fn is_missing(cell: &ValueRef<'_>) -> bool {
    cell.is_missing()
}

/// Reports the first present cell whose type the constraint rejects.
///
/// Missing cells are left to the nullability rule.
fn type_violation(constraint: &ColumnConstraint, data: &ColumnData) -> Option<Violation> {
    if matches!(data.value_type(), Some(found) if constraint.accepts_type(found)) {
        return None;
    }
    let mut offending = data
        .cells()
        .enumerate()
        .filter(|(_, cell)| !is_missing(cell) && !constraint.accepts_type(cell.value_type()));
    let (row, cell) = offending.next()?;
    let failure_count = 1 + offending.count();
    Some(Violation::type_mismatch(
        &constraint.name,
        constraint.dtype,
        Some(row),
        Some(cell.to_value()),
        failure_count,
    ))
}

fn null_violation(constraint: &ColumnConstraint, data: &ColumnData) -> Option<Violation> {
    let mut missing = data.cells().enumerate().filter(|(_, cell)| is_missing(cell));
    let (row, cell) = missing.next()?;
    let failure_count = 1 + missing.count();
    Some(Violation::constraint(
        &constraint.name,
        "not_null",
        "non-null values".to_string(),
        row,
        cell.to_value(),
        failure_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Value, ValueType};
    use crate::schema::{Check, ViolationKind};
    use crate::test_fixtures::{employee_schema, employees};

    #[test]
    fn test_valid_employees_pass() {
        let result = validate(&employees(), &employee_schema());
        assert!(result.is_pass());
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_out_of_range_age() {
        let data = Dataset::builder()
            .int_column("age", vec![150])
            .float_column("salary", vec![50000.0])
            .text_column("country", vec!["US"])
            .build()
            .unwrap();

        let result = validate(&data, &employee_schema());
        assert!(result.is_failure());
        let violation = result.first_violation().unwrap();
        assert_eq!(violation.kind, ViolationKind::ConstraintViolation);
        assert_eq!(violation.column, "age");
        assert_eq!(violation.check.as_deref(), Some("in_range"));
        assert_eq!(violation.value, Some(Value::Int(150)));
        assert_eq!(violation.row, Some(0));
    }

    #[test]
    fn test_missing_column() {
        let data = Dataset::builder()
            .int_column("age", vec![30])
            .text_column("country", vec!["US"])
            .build()
            .unwrap();

        let result = validate(&data, &employee_schema());
        let violation = result.first_violation().unwrap();
        assert_eq!(violation.kind, ViolationKind::MissingColumn);
        assert_eq!(violation.column, "salary");
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let data = Dataset::builder()
            .int_column("age", vec![30])
            .float_column("salary", vec![1.0])
            .text_column("country", vec!["DE"])
            .text_column("nickname", vec!["whatever"])
            .build()
            .unwrap();
        assert!(validate(&data, &employee_schema()).is_pass());
    }

    #[test]
    fn test_type_mismatch_homogeneous_column() {
        let data = Dataset::builder()
            .float_column("age", vec![30.0, 40.0])
            .float_column("salary", vec![1.0, 2.0])
            .text_column("country", vec!["US", "UK"])
            .build()
            .unwrap();

        let violation = validate(&data, &employee_schema())
            .first_violation()
            .cloned()
            .unwrap();
        assert_eq!(violation.kind, ViolationKind::TypeMismatch);
        assert_eq!(violation.row, Some(0));
        assert_eq!(violation.expected, "type int");
        assert_eq!(violation.failure_count, 2);
    }

    #[test]
    fn test_type_mismatch_points_at_first_foreign_row() {
        let data = Dataset::builder()
            .value_column(
                "age",
                vec![Value::Int(30), Value::Int(31), Value::from("n/a"), Value::from("?")],
            )
            .float_column("salary", vec![1.0; 4])
            .text_column("country", vec!["US"; 4])
            .build()
            .unwrap();

        let violation = validate(&data, &employee_schema())
            .first_violation()
            .cloned()
            .unwrap();
        assert_eq!(violation.kind, ViolationKind::TypeMismatch);
        assert_eq!(violation.row, Some(2));
        assert_eq!(violation.value, Some(Value::from("n/a")));
        assert_eq!(violation.failure_count, 2);
    }

    #[test]
    fn test_coerce_allows_int_salary() {
        let schema = Schema::builder("s")
            .column(
                crate::schema::ColumnConstraint::new("salary", ValueType::Float)
                    .coerce(true)
                    .check(Check::non_negative()),
            )
            .build()
            .unwrap();
        let data = Dataset::builder()
            .int_column("salary", vec![100, 200])
            .build()
            .unwrap();
        assert!(validate(&data, &schema).is_pass());
    }

    #[test]
    fn test_nan_is_a_null_violation_unless_nullable() {
        let data = Dataset::builder()
            .float_column("score", vec![1.0, f64::NAN, 3.0])
            .build()
            .unwrap();

        let strict = Schema::builder("s")
            .column(crate::schema::ColumnConstraint::new("score", ValueType::Float))
            .build()
            .unwrap();
        let violation = validate(&data, &strict).first_violation().cloned().unwrap();
        assert_eq!(violation.check.as_deref(), Some("not_null"));
        assert_eq!(violation.row, Some(1));

        let relaxed = Schema::builder("s")
            .column(
                crate::schema::ColumnConstraint::new("score", ValueType::Float)
                    .nullable(true)
                    .check(Check::in_range(0.0, 5.0)),
            )
            .build()
            .unwrap();
        assert!(validate(&data, &relaxed).is_pass());
    }

    #[test]
    fn test_missing_text_cell_is_a_null_violation() {
        let data = Dataset::builder()
            .value_column(
                "country",
                vec![Value::from("US"), Value::missing(), Value::from("FR")],
            )
            .build()
            .unwrap();
        let column = |nullable| {
            Schema::builder("s")
                .column(
                    crate::schema::ColumnConstraint::new("country", ValueType::Text)
                        .nullable(nullable)
                        .check(Check::is_in(vec![Value::from("US"), Value::from("UK")])),
                )
                .build()
                .unwrap()
        };

        let result = validate_with_mode(&data, &column(false), ValidationMode::AccumulateAll);
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[0].kind, ViolationKind::ConstraintViolation);
        assert_eq!(result.violations[0].check.as_deref(), Some("not_null"));
        assert_eq!(result.violations[0].row, Some(1));
        assert_eq!(result.violations[1].check.as_deref(), Some("is_in"));
        assert_eq!(result.violations[1].row, Some(2));

        let relaxed = validate_with_mode(&data, &column(true), ValidationMode::AccumulateAll);
        assert_eq!(relaxed.violations.len(), 1);
        assert_eq!(relaxed.violations[0].check.as_deref(), Some("is_in"));
    }

    #[test]
    fn test_type_scan_skips_gaps() {
        let data = Dataset::builder()
            .value_column(
                "age",
                vec![Value::missing(), Value::from("old"), Value::Int(3)],
            )
            .build()
            .unwrap();
        let schema = Schema::builder("s")
            .column(crate::schema::ColumnConstraint::new("age", ValueType::Int))
            .build()
            .unwrap();

        let violation = validate(&data, &schema).first_violation().cloned().unwrap();
        assert_eq!(violation.kind, ViolationKind::TypeMismatch);
        assert_eq!(violation.row, Some(1));
        assert_eq!(violation.failure_count, 1);
    }

    #[test]
    fn test_fail_fast_reports_only_first() {
        let data = Dataset::builder()
            .int_column("age", vec![150, -1])
            .float_column("salary", vec![-5.0, 10.0])
            .text_column("country", vec!["FR", "US"])
            .build()
            .unwrap();

        let result = validate_with_mode(&data, &employee_schema(), ValidationMode::FailFast);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].column, "age");
        assert_eq!(result.violations[0].failure_count, 2);
    }

    #[test]
    fn test_accumulate_all_reports_every_rule() {
        let data = Dataset::builder()
            .int_column("age", vec![150, -1])
            .float_column("salary", vec![-5.0, 10.0])
            .text_column("country", vec!["FR", "US"])
            .build()
            .unwrap();

        let result = validate_with_mode(&data, &employee_schema(), ValidationMode::AccumulateAll);
        let columns: Vec<_> = result.violations.iter().map(|v| v.column.as_str()).collect();
        assert_eq!(columns, vec!["age", "salary", "country"]);
        assert_eq!(result.violations[2].value, Some(Value::from("FR")));
    }

    #[test]
    fn test_accumulate_all_orders_checks_within_column() {
        let schema = Schema::builder("s")
            .column(
                crate::schema::ColumnConstraint::new("code", ValueType::Text)
                    .check(Check::StrLength {
                        min: Some(2),
                        max: Some(2),
                    })
                    .check(Check::str_matches("[A-Z]+").unwrap()),
            )
            .build()
            .unwrap();
        let data = Dataset::builder()
            .text_column("code", vec!["US", "usa"])
            .build()
            .unwrap();

        let result = validate_with_mode(&data, &schema, ValidationMode::AccumulateAll);
        let checks: Vec<_> = result
            .violations
            .iter()
            .map(|v| v.check.clone().unwrap())
            .collect();
        assert_eq!(checks, vec!["str_length", "str_matches"]);
        assert!(result.violations.iter().all(|v| v.row == Some(1)));
    }
}

//! End-to-end gate scenarios: employee records and feature drift.

use quality_gate::config::{GateConfig, ValidationMode};
use quality_gate::dataset::{Dataset, Value, ValueType};
use quality_gate::drift::{detect_drift, SkipReason};
use quality_gate::gate::{run_gate, QualityGate, VerdictKind};
use quality_gate::schema::{validate, Check, ColumnConstraint, Schema, ViolationKind};

fn employee_schema() -> Schema {
    Schema::builder("employees")
        .column(ColumnConstraint::new("age", ValueType::Int).check(Check::in_range(0.0, 120.0)))
        .column(ColumnConstraint::new("salary", ValueType::Float).check(Check::non_negative()))
        .column(
            ColumnConstraint::new("country", ValueType::Text)
                .check(Check::is_in(["US", "UK", "IN", "CA", "DE"])),
        )
        .build()
        .unwrap()
}

fn employees(ages: Vec<i64>, salaries: Vec<f64>, countries: Vec<&str>) -> Dataset {
    Dataset::builder()
        .int_column("age", ages)
        .float_column("salary", salaries)
        .text_column("country", countries)
        .build()
        .unwrap()
}

fn single_feature(values: Vec<i64>) -> Dataset {
    Dataset::builder()
        .int_column("feature1", values)
        .build()
        .unwrap()
}

#[test]
fn valid_employees_pass_validation() {
    let data = employees(
        vec![30, 45, 25],
        vec![50000.0, 75000.0, 60000.0],
        vec!["US", "UK", "IN"],
    );
    let result = validate(&data, &employee_schema());
    assert!(result.is_pass());
}

#[test]
fn out_of_range_age_is_a_constraint_violation() {
    let data = employees(vec![150], vec![50000.0], vec!["US"]);
    let result = validate(&data, &employee_schema());

    assert!(result.is_failure());
    let violation = result.first_violation().unwrap();
    assert_eq!(violation.kind, ViolationKind::ConstraintViolation);
    assert_eq!(violation.column, "age");
    assert_eq!(violation.value, Some(Value::Int(150)));
}

#[test]
fn absent_column_is_reported_missing() {
    let data = Dataset::builder()
        .int_column("age", vec![30])
        .float_column("salary", vec![1.0])
        .build()
        .unwrap();
    let result = validate(&data, &employee_schema());
    let violation = result.first_violation().unwrap();
    assert_eq!(violation.kind, ViolationKind::MissingColumn);
    assert_eq!(violation.column, "country");
}

#[test]
fn small_uniform_shift_does_not_drift() {
    let report = detect_drift(
        &single_feature(vec![10, 15, 12]),
        &single_feature(vec![11, 16, 13]),
        0.1,
    )
    .unwrap();
    assert!(report.drifted_columns.is_empty());
    assert!(report.column("feature1").unwrap().p_value >= 0.1);
}

#[test]
fn disjoint_ranges_drift_with_tiny_p_value() {
    let report = detect_drift(
        &single_feature((0..100).collect()),
        &single_feature((1000..1100).collect()),
        0.1,
    )
    .unwrap();
    assert_eq!(report.drifted_columns.len(), 1);
    let drifted = &report.drifted_columns[0];
    assert_eq!(drifted.name, "feature1");
    assert!(drifted.p_value < 1e-6);
}

#[test]
fn single_value_columns_are_skipped() {
    let report = detect_drift(&single_feature(vec![1]), &single_feature(vec![500, 600]), 0.1)
        .unwrap();
    assert!(report.drifted_columns.is_empty());
    assert_eq!(report.skipped("feature1"), Some(SkipReason::InsufficientSamples));
}

#[test]
fn gate_reports_every_failing_dimension() {
    let reference = Dataset::builder()
        .int_column("age", (20..60).collect())
        .float_column("salary", (0..40).map(|i| 40000.0 + i as f64 * 100.0).collect())
        .text_column("country", vec!["US"; 40])
        .build()
        .unwrap();
    let current = Dataset::builder()
        .int_column("age", (20..60).map(|a| if a == 59 { 150 } else { a }).collect())
        .float_column("salary", (0..40).map(|i| 90000.0 + i as f64 * 100.0).collect())
        .text_column("country", vec!["DE"; 40])
        .build()
        .unwrap();

    let verdict = run_gate(&reference, &current, &employee_schema(), 0.1).unwrap();
    assert_eq!(verdict.verdict_kind, VerdictKind::SchemaAndDriftFail);
    assert!(verdict.reference_validation.is_pass());
    assert_eq!(
        verdict.current_validation.first_violation().unwrap().value,
        Some(Value::Int(150))
    );

    let drifted: Vec<_> = verdict.drifted_columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(drifted, vec!["salary"]);
    assert!(verdict
        .skipped_columns
        .iter()
        .any(|s| s.name == "country" && s.reason == SkipReason::NonNumeric));
}

#[test]
fn accumulate_all_gate_lists_all_violations() {
    let data = employees(vec![150, -3], vec![-1.0, 10.0], vec!["FR", "US"]);
    let gate = QualityGate::new(
        GateConfig::default().with_validation_mode(ValidationMode::AccumulateAll),
    )
    .unwrap();
    let verdict = gate.run(&data, &data, &employee_schema());

    assert_eq!(verdict.verdict_kind, VerdictKind::SchemaFail);
    assert_eq!(verdict.reference_validation.violations.len(), 3);
    assert_eq!(verdict.reference_validation.violations[0].failure_count, 2);
    assert_eq!(verdict.reference_validation, verdict.current_validation);
}

#[test]
fn verdict_serializes_to_one_self_describing_line() {
    let data = employees(vec![30, 45], vec![1.0, 2.0], vec!["US", "UK"]);
    let verdict = run_gate(&data, &data, &employee_schema(), 0.1).unwrap();
    let line = verdict.to_json_line().unwrap();

    assert!(!line.contains('\n'));
    let json: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(json["verdict_kind"], "PASS");
    assert_eq!(json["reference_validation"]["passed"], true);
    assert_eq!(json["current_validation"]["passed"], true);
    assert!(json["drifted_columns"].is_array());
}

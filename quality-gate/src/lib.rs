//! # Quality Gate
//!
//! A data quality gate for tabular datasets. A gate run takes a reference
//! dataset, a current dataset and a schema, and produces one verdict:
//!
//! - both datasets are validated against the schema (presence, type, value
//!   checks)
//! - every shared numeric column is compared with a two-sample
//!   Kolmogorov-Smirnov test
//! - the outcomes merge into `PASS`, `SCHEMA_FAIL`, `DRIFT_FAIL` or
//!   `SCHEMA_AND_DRIFT_FAIL`
//!
//! Bad data never makes a run fail. Findings are part of the verdict, and
//! only malformed schemas, datasets or configuration surface as
//! [`GateError`](error::GateError).
//!
//! ## Quick Start
//!
//! ```rust
//! use quality_gate::prelude::*;
//!
//! let schema = Schema::builder("employees")
//!     .column(ColumnConstraint::new("age", ValueType::Int).check(Check::in_range(0.0, 120.0)))
//!     .column(ColumnConstraint::new("salary", ValueType::Float).check(Check::non_negative()))
//!     .column(
//!         ColumnConstraint::new("country", ValueType::Text)
//!             .check(Check::is_in(["US", "UK", "IN", "CA", "DE"])),
//!     )
//!     .build()?;
//!
//! let reference = Dataset::builder()
//!     .int_column("age", vec![30, 45, 25])
//!     .float_column("salary", vec![50000.0, 75000.0, 60000.0])
//!     .text_column("country", vec!["US", "UK", "IN"])
//!     .build()?;
//! let current = Dataset::builder()
//!     .int_column("age", vec![150, 45, 25])
//!     .float_column("salary", vec![50000.0, 75000.0, 60000.0])
//!     .text_column("country", vec!["US", "UK", "IN"])
//!     .build()?;
//!
//! let verdict = QualityGate::new(GateConfig::default())?.run(&reference, &current, &schema);
//! assert_eq!(verdict.verdict_kind, VerdictKind::SchemaFail);
//! println!("{}", verdict.to_json_line()?);
//! # Ok::<(), GateError>(())
//! ```
//!
//! ## Modules
//!
//! - **`dataset`**: typed in-memory columns
//! - **`schema`**: column constraints and the schema validator
//! - **`drift`**: the KS drift detector
//! - **`gate`**: the composition root and verdict model
//! - **`pipeline`**: freshness checks, lineage logging, the dataset catalog
//!   and sampling
//! - **`sources`**: CSV and Arrow ingestion
//! - **`formatters`**: JSON, console and Markdown verdict output

pub mod config;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod formatters;
pub mod gate;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod schema;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

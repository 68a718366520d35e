//! Column schemas and the schema validator.
//!
//! A [`Schema`] is an ordered, immutable list of [`ColumnConstraint`]s. Each
//! constraint declares a column's primitive type and zero or more value
//! [`Check`]s. Malformed declarations (a range with `min > max`, a regex check
//! on an integer column, a column declared twice) are rejected when the schema
//! is built, so [`validate`] itself never fails.
//!
//! # Examples
//!
//! ```rust
//! use quality_gate::dataset::{Dataset, ValueType};
//! use quality_gate::schema::{validate, Check, ColumnConstraint, Schema};
//!
//! let schema = Schema::builder("employees")
//!     .column(ColumnConstraint::new("age", ValueType::Int).check(Check::in_range(0.0, 120.0)))
//!     .column(ColumnConstraint::new("salary", ValueType::Float).check(Check::non_negative()))
//!     .column(
//!         ColumnConstraint::new("country", ValueType::Text)
//!             .check(Check::is_in(["US", "UK", "IN", "CA", "DE"])),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let data = Dataset::builder()
//!     .int_column("age", vec![30, 45, 25])
//!     .float_column("salary", vec![50000.0, 75000.0, 60000.0])
//!     .text_column("country", vec!["US", "UK", "IN"])
//!     .build()
//!     .unwrap();
//!
//! assert!(validate(&data, &schema).is_pass());
//! ```
//!
//! Schemas can also be loaded from JSON:
//!
//! ```rust
//! use quality_gate::schema::Schema;
//!
//! let schema = Schema::from_json(r#"{
//!     "name": "employees",
//!     "columns": [
//!         {"name": "age", "dtype": "int", "checks": [{"in_range": {"min": 0, "max": 120}}]},
//!         {"name": "country", "dtype": "text", "checks": [{"is_in": ["US", "UK"]}]}
//!     ]
//! }"#).unwrap();
//! assert_eq!(schema.len(), 2);
//! ```

mod check;
mod result;
mod validator;

pub use check::{Check, Pattern};
pub use result::{ValidationResult, Violation, ViolationKind};
pub use validator::{validate, validate_with_mode, SchemaValidator};

use crate::dataset::ValueType;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Type and value constraints for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConstraint {
    /// Column name
    pub name: String,
    /// Expected primitive type
    pub dtype: ValueType,
    /// Whether NaN (missing) values are allowed in numeric columns
    #[serde(default)]
    pub nullable: bool,
    /// Whether an integer column may satisfy a float declaration
    #[serde(default)]
    pub coerce: bool,
    /// Value predicates, evaluated in declaration order
    #[serde(default)]
    pub checks: Vec<Check>,
}

impl ColumnConstraint {
    pub fn new(name: impl Into<String>, dtype: ValueType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: false,
            coerce: false,
            checks: Vec::new(),
        }
    }

    /// Appends a value check.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    /// Whether a column stored as `found` satisfies this declaration.
    pub(crate) fn accepts_type(&self, found: ValueType) -> bool {
        found == self.dtype
            || (self.coerce && found == ValueType::Int && self.dtype == ValueType::Float)
    }

    fn validate_definition(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(GateError::InvalidSchema(
                "column name must not be empty".to_string(),
            ));
        }
        for check in &self.checks {
            check.validate_definition(&self.name, self.dtype)?;
        }
        Ok(())
    }
}

/// Serialized form of a schema, as read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<ColumnConstraint>,
}

/// An immutable, validated set of column constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    name: String,
    columns: Vec<ColumnConstraint>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Validates a deserialized spec into a schema.
    pub fn from_spec(spec: SchemaSpec) -> Result<Self> {
        let mut builder = Schema::builder(spec.name.unwrap_or_else(|| "schema".to_string()));
        for column in spec.columns {
            builder = builder.column(column);
        }
        builder.build()
    }

    /// Parses and validates a JSON schema document.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: SchemaSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constraints in declaration order; validation visits them in this order.
    pub fn columns(&self) -> &[ColumnConstraint] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnConstraint> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    columns: Vec<ColumnConstraint>,
}

impl SchemaBuilder {
    pub fn column(mut self, column: ColumnConstraint) -> Self {
        self.columns.push(column);
        self
    }

    /// Checks every declaration and freezes the schema.
    pub fn build(self) -> Result<Schema> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(GateError::InvalidSchema(format!(
                    "column '{}' is declared more than once",
                    column.name
                )));
            }
            column.validate_definition()?;
        }
        Ok(Schema {
            name: self.name,
            columns: self.columns,
        })
    }
}

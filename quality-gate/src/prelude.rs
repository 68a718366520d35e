//! Commonly used types and traits.

pub use crate::config::{GateConfig, KsMethod, ValidationMode};
pub use crate::dataset::{Dataset, Value, ValueType};
pub use crate::drift::{detect_drift, DriftReport};
pub use crate::error::{ErrorContext, GateError, Result};
pub use crate::formatters::{FormatterConfig, VerdictFormatter};
pub use crate::gate::{run_gate, QualityGate, QualityVerdict, VerdictKind};
pub use crate::logging::LogConfig;
pub use crate::schema::{validate, Check, ColumnConstraint, Schema, ValidationResult};

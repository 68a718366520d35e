//! Per-column value predicates.

use crate::dataset::{Value, ValueRef, ValueType};
use crate::prelude::*;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A compiled regular expression that must match a whole text value.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`, anchored at both ends.
    pub fn new(source: impl Into<String>) -> std::result::Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source).map_err(serde::de::Error::custom)
    }
}

/// A value predicate attached to a column.
///
/// Serialized externally tagged in snake case, e.g.
/// `{"in_range": {"min": 0, "max": 120}}` or `{"is_in": ["US", "UK"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// `min <= value <= max`
    InRange { min: f64, max: f64 },
    GreaterThan(f64),
    /// `value >= bound`; `GreaterThanOrEqual(0.0)` is the non-negativity check
    GreaterThanOrEqual(f64),
    LessThan(f64),
    LessThanOrEqual(f64),
    /// Value must be one of the listed members
    IsIn(Vec<Value>),
    /// Value must not be any of the listed members
    NotIn(Vec<Value>),
    /// Whole-string regex match
    StrMatches(Pattern),
    /// Character count bounds, inclusive
    StrLength {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
}

impl Check {
    pub fn in_range(min: f64, max: f64) -> Self {
        Check::InRange { min, max }
    }

    pub fn non_negative() -> Self {
        Check::GreaterThanOrEqual(0.0)
    }

    pub fn is_in<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Check::IsIn(members.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Check::NotIn(members.into_iter().map(Into::into).collect())
    }

    /// Builds a regex check, failing on an invalid pattern.
    pub fn str_matches(pattern: &str) -> Result<Self> {
        Pattern::new(pattern).map(Check::StrMatches).map_err(|e| {
            GateError::InvalidSchema(format!("invalid regex '{pattern}': {e}"))
        })
    }

    /// Stable snake_case name used in violations and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Check::InRange { .. } => "in_range",
            Check::GreaterThan(_) => "greater_than",
            Check::GreaterThanOrEqual(_) => "greater_than_or_equal",
            Check::LessThan(_) => "less_than",
            Check::LessThanOrEqual(_) => "less_than_or_equal",
            Check::IsIn(_) => "is_in",
            Check::NotIn(_) => "not_in",
            Check::StrMatches(_) => "str_matches",
            Check::StrLength { .. } => "str_length",
        }
    }

    /// Human-readable statement of what a passing value looks like.
    pub fn describe(&self) -> String {
        match self {
            Check::InRange { min, max } => format!("value in [{min}, {max}]"),
            Check::GreaterThan(b) => format!("value > {b}"),
            Check::GreaterThanOrEqual(b) => format!("value >= {b}"),
            Check::LessThan(b) => format!("value < {b}"),
            Check::LessThanOrEqual(b) => format!("value <= {b}"),
            Check::IsIn(members) => format!("value in {{{}}}", join_values(members)),
            Check::NotIn(members) => format!("value not in {{{}}}", join_values(members)),
            Check::StrMatches(p) => format!("text matching /{}/", p.as_str()),
            Check::StrLength { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("text length in [{lo}, {hi}]"),
                (Some(lo), None) => format!("text length >= {lo}"),
                (None, Some(hi)) => format!("text length <= {hi}"),
                (None, None) => "any text length".to_string(),
            },
        }
    }

    /// Rejects checks that can never be evaluated against `dtype`.
    pub(crate) fn validate_definition(&self, column: &str, dtype: ValueType) -> Result<()> {
        let fail = |message: String| Err(GateError::invalid_constraint(column, message));

        match self {
            Check::InRange { min, max } => {
                require_numeric(column, self, dtype)?;
                if !min.is_finite() || !max.is_finite() {
                    return fail(format!("in_range bounds must be finite, got [{min}, {max}]"));
                }
                if min > max {
                    return fail(format!(
                        "in_range lower bound {min} exceeds upper bound {max}"
                    ));
                }
            }
            Check::GreaterThan(b)
            | Check::GreaterThanOrEqual(b)
            | Check::LessThan(b)
            | Check::LessThanOrEqual(b) => {
                require_numeric(column, self, dtype)?;
                if !b.is_finite() {
                    return fail(format!("{} bound must be finite, got {b}", self.name()));
                }
            }
            Check::IsIn(members) | Check::NotIn(members) => {
                if let Some(bad) = members.iter().find(|m| !member_fits(m, dtype)) {
                    return fail(format!(
                        "{} member {bad} is not compatible with column type {dtype}",
                        self.name()
                    ));
                }
            }
            Check::StrMatches(_) => require_text(column, self, dtype)?,
            Check::StrLength { min, max } => {
                require_text(column, self, dtype)?;
                match (min, max) {
                    (None, None) => return fail("str_length needs a min or a max".to_string()),
                    (Some(lo), Some(hi)) if lo > hi => {
                        return fail(format!(
                            "str_length lower bound {lo} exceeds upper bound {hi}"
                        ))
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Evaluates the predicate on one cell.
    ///
    /// Cells of the wrong kind (text for a numeric check and vice versa) never
    /// hold; the validator reports type mismatches before reaching here.
    pub fn holds(&self, cell: ValueRef<'_>) -> bool {
        match self {
            Check::InRange { min, max } => cell.as_f64().is_some_and(|v| v >= *min && v <= *max),
            Check::GreaterThan(b) => cell.as_f64().is_some_and(|v| v > *b),
            Check::GreaterThanOrEqual(b) => cell.as_f64().is_some_and(|v| v >= *b),
            Check::LessThan(b) => cell.as_f64().is_some_and(|v| v < *b),
            Check::LessThanOrEqual(b) => cell.as_f64().is_some_and(|v| v <= *b),
            Check::IsIn(members) => members.iter().any(|m| cell.matches(m)),
            Check::NotIn(members) => !members.iter().any(|m| cell.matches(m)),
            Check::StrMatches(pattern) => cell.as_str().is_some_and(|s| pattern.is_match(s)),
            Check::StrLength { min, max } => cell.as_str().is_some_and(|s| {
                let len = s.chars().count();
                min.is_none_or(|lo| len >= lo) && max.is_none_or(|hi| len <= hi)
            }),
        }
    }
}

fn require_numeric(column: &str, check: &Check, dtype: ValueType) -> Result<()> {
    if dtype.is_numeric() {
        Ok(())
    } else {
        Err(GateError::invalid_constraint(
            column,
            format!("{} requires a numeric column, declared {dtype}", check.name()),
        ))
    }
}

fn require_text(column: &str, check: &Check, dtype: ValueType) -> Result<()> {
    if dtype == ValueType::Text {
        Ok(())
    } else {
        Err(GateError::invalid_constraint(
            column,
            format!("{} requires a text column, declared {dtype}", check.name()),
        ))
    }
}

fn member_fits(member: &Value, dtype: ValueType) -> bool {
    match (member, dtype) {
        (Value::Text(_), ValueType::Text) => true,
        (Value::Int(_), ValueType::Int) => true,
        (Value::Int(_) | Value::Float(_), ValueType::Float) => true,
        _ => false,
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.describe())
    }
}

//! In-memory tabular datasets.
//!
//! A [`Dataset`] is an ordered list of named, equal-length [`Column`]s. Each
//! column stores its cells in a homogeneous backing vector chosen once, when
//! the column is built:
//!
//! ```text
//! [Int(1), Int(2)]               -> ColumnData::Int
//! [Int(1), Float(2.5)]           -> ColumnData::Float   (promotion)
//! [Text("a"), Text("b")]         -> ColumnData::Text
//! [Int(1), Text("oops")]         -> ColumnData::Mixed   (kept for diagnostics)
//! [Text("a"), Value::missing()]  -> ColumnData::Mixed   (text with gaps)
//! ```
//!
//! A missing cell is a `NaN` float ([`Value::missing`]). Numeric columns hold
//! it inline; a text column with gaps becomes `Mixed`.
//!
//! `Mixed` columns only arise from raw cell ingestion and exist so the schema
//! validator can point at the first row whose type disagrees with the
//! declaration, and tell a gap apart from a wrong type.
//!
//! # Examples
//!
//! ```rust
//! use quality_gate::dataset::Dataset;
//!
//! let employees = Dataset::builder()
//!     .origin("s3://hr/employees.csv")
//!     .int_column("age", vec![30, 45, 25])
//!     .float_column("salary", vec![50000.0, 75000.0, 60000.0])
//!     .text_column("country", vec!["US", "UK", "IN"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(employees.row_count(), 3);
//! assert_eq!(employees.column_names(), vec!["age", "salary", "country"]);
//! ```

mod value;

pub use value::{Value, ValueRef, ValueType};

use crate::prelude::*;
use std::collections::HashMap;

/// Homogeneous backing storage for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
    /// Heterogeneous cells that could not be unified at ingestion.
    Mixed(Vec<Value>),
}

impl ColumnData {
    /// Infers the narrowest homogeneous representation for raw cells.
    ///
    /// Ints mixed with floats are promoted to `Float`. Any other mixture is
    /// kept as `Mixed`. An empty input yields an empty `Mixed` column, which
    /// has no type.
    pub fn from_values(values: Vec<Value>) -> Self {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_text = false;
        for value in &values {
            match value {
                Value::Int(_) => has_int = true,
                Value::Float(_) => has_float = true,
                Value::Text(_) => has_text = true,
            }
        }

        match (has_int, has_float, has_text) {
            (true, false, false) => ColumnData::Int(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Int(i) => Some(i),
                        _ => None,
                    })
                    .collect(),
            ),
            (_, true, false) => ColumnData::Float(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Int(i) => Some(i as f64),
                        Value::Float(f) => Some(f),
                        Value::Text(_) => None,
                    })
                    .collect(),
            ),
            (false, false, true) => ColumnData::Text(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Text(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => ColumnData::Mixed(values),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Mixed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column's type, or `None` for mixed columns.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            ColumnData::Int(_) => Some(ValueType::Int),
            ColumnData::Float(_) => Some(ValueType::Float),
            ColumnData::Text(_) => Some(ValueType::Text),
            ColumnData::Mixed(_) => None,
        }
    }

    /// Borrows the cell at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn cell(&self, row: usize) -> ValueRef<'_> {
        match self {
            ColumnData::Int(v) => ValueRef::Int(v[row]),
            ColumnData::Float(v) => ValueRef::Float(v[row]),
            ColumnData::Text(v) => ValueRef::Text(&v[row]),
            ColumnData::Mixed(v) => v[row].as_value_ref(),
        }
    }

    /// Iterates over all cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = ValueRef<'_>> + '_ {
        (0..self.len()).map(move |row| self.cell(row))
    }

    /// Returns the values as `f64` for numeric columns, `None` otherwise.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            ColumnData::Text(_) | ColumnData::Mixed(_) => None,
        }
    }

    /// Builds a new column holding the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Int(v) => ColumnData::Int(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Float(v) => ColumnData::Float(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
            ColumnData::Mixed(v) => ColumnData::Mixed(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Builds a column from raw cells, inferring its storage once.
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(name, ColumnData::from_values(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An ordered set of named, equal-length columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    origin: Option<String>,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Creates a dataset, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.name.clone(), position).is_some() {
                return Err(GateError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        if let Some(first) = columns.first() {
            if let Some(ragged) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(GateError::InvalidDataset(format!(
                    "column '{}' has {} rows but column '{}' has {}",
                    ragged.name,
                    ragged.len(),
                    first.name,
                    first.len()
                )));
            }
        }

        Ok(Self {
            origin: None,
            columns,
            index,
        })
    }

    /// Returns a builder for assembling a dataset column by column.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Attaches an origin string (path, URI) used for lineage records.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Number of rows; zero for a dataset without columns.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Returns a new dataset holding only `rows`, in the given order.
    ///
    /// Indices must be in bounds; the sampler is the only caller and
    /// guarantees that.
    pub fn take_rows(&self, rows: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.take(rows)))
            .collect();
        Dataset {
            origin: self.origin.clone(),
            columns,
            index: self.index.clone(),
        }
    }
}

/// Builder for [`Dataset`].
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    origin: Option<String>,
    columns: Vec<Column>,
}

impl DatasetBuilder {
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn int_column(self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.column(Column::new(name, ColumnData::Int(values)))
    }

    pub fn float_column(self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.column(Column::new(name, ColumnData::Float(values)))
    }

    pub fn text_column<S: Into<String>>(self, name: impl Into<String>, values: Vec<S>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.column(Column::new(name, ColumnData::Text(values)))
    }

    /// Adds a column from raw cells; see [`ColumnData::from_values`].
    pub fn value_column(self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.column(Column::from_values(name, values))
    }

    pub fn build(self) -> Result<Dataset> {
        let dataset = Dataset::new(self.columns)?;
        Ok(match self.origin {
            Some(origin) => dataset.with_origin(origin),
            None => dataset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_inference() {
        assert_eq!(
            ColumnData::from_values(vec![Value::Int(1), Value::Int(2)]),
            ColumnData::Int(vec![1, 2])
        );
        assert_eq!(
            ColumnData::from_values(vec![Value::Int(1), Value::Float(2.5)]),
            ColumnData::Float(vec![1.0, 2.5])
        );
        assert_eq!(
            ColumnData::from_values(vec![Value::from("a"), Value::from("b")]),
            ColumnData::Text(vec!["a".to_string(), "b".to_string()])
        );

        let mixed = ColumnData::from_values(vec![Value::Int(1), Value::from("x")]);
        assert!(matches!(mixed, ColumnData::Mixed(_)));
        assert_eq!(mixed.value_type(), None);
        assert_eq!(mixed.cell(1), ValueRef::Text("x"));
    }

    #[test]
    fn test_empty_values_have_no_type() {
        let empty = ColumnData::from_values(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.value_type(), None);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Dataset::builder()
            .int_column("id", vec![1])
            .int_column("id", vec![2])
            .build()
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidDataset(_)));
        assert!(err.to_string().contains("duplicate column name 'id'"));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Dataset::builder()
            .int_column("id", vec![1, 2, 3])
            .text_column("name", vec!["a", "b"])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("column 'name' has 2 rows"));
    }

    #[test]
    fn test_lookup_and_take_rows() {
        let ds = Dataset::builder()
            .origin("memory://people")
            .int_column("id", vec![1, 2, 3, 4])
            .text_column("name", vec!["a", "b", "c", "d"])
            .build()
            .unwrap();

        assert_eq!(ds.origin(), Some("memory://people"));
        assert!(ds.column("missing").is_none());
        assert_eq!(ds.column("name").unwrap().data().cell(2), ValueRef::Text("c"));

        let subset = ds.take_rows(&[3, 0]);
        assert_eq!(subset.row_count(), 2);
        assert_eq!(subset.column("id").unwrap().data(), &ColumnData::Int(vec![4, 1]));
        assert_eq!(subset.origin(), Some("memory://people"));
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(
            ColumnData::Int(vec![1, 2]).as_f64_vec(),
            Some(vec![1.0, 2.0])
        );
        assert_eq!(ColumnData::Text(vec!["1".into()]).as_f64_vec(), None);
    }
}

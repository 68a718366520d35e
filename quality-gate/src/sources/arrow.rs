//! Conversion between Arrow record batches and [`Dataset`]s.
//!
//! | Arrow type                          | Column        | Nulls              |
//! |-------------------------------------|---------------|--------------------|
//! | `Int8`..`Int64`, `UInt8`..`UInt64`  | `Int`         | promote to `Float` with `NaN` |
//! | `Float16`..`Float64`                | `Float`       | `NaN`              |
//! | `Utf8`, `LargeUtf8`, `Utf8View`     | `Text`        | `Mixed` with missing cells |
//!
//! Anything else is [`GateError::NotSupported`].

use crate::dataset::{Column, ColumnData, Dataset, Value};
use crate::prelude::*;
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

const SOURCE_TYPE: &str = "Arrow";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
    Text,
}

fn kind_of(field: &Field) -> Result<Kind> {
    match field.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Ok(Kind::Int),
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Ok(Kind::Float),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Ok(Kind::Text),
        other => Err(GateError::NotSupported(format!(
            "column '{}' has unsupported type {other}",
            field.name()
        ))),
    }
}

/// Accumulates one column across batches.
enum ColumnBuffer {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
}

impl ColumnBuffer {
    fn new(kind: Kind) -> Self {
        match kind {
            Kind::Int => ColumnBuffer::Int(Vec::new()),
            Kind::Float => ColumnBuffer::Float(Vec::new()),
            Kind::Text => ColumnBuffer::Text(Vec::new()),
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnBuffer::Int(v) => v.len(),
            ColumnBuffer::Float(v) => v.len(),
            ColumnBuffer::Text(v) => v.len(),
        }
    }

    fn promote_to_float(&mut self) {
        if let ColumnBuffer::Int(values) = self {
            let floats = values.iter().map(|&i| i as f64).collect();
            *self = ColumnBuffer::Float(floats);
        }
    }

    fn append(&mut self, array: &ArrayRef) -> Result<()> {
        match self {
            ColumnBuffer::Int(_) => {
                let ints = cast(array, &DataType::Int64)?;
                let ints = ints.as_primitive::<Int64Type>();
                if ints.null_count() > 0 {
                    self.promote_to_float();
                    return self.append(array);
                }
                if let ColumnBuffer::Int(values) = self {
                    values.extend(ints.values().iter().copied());
                }
            }
            ColumnBuffer::Float(values) => {
                let floats = cast(array, &DataType::Float64)?;
                let floats = floats.as_primitive::<Float64Type>();
                values.extend(floats.iter().map(|v| v.unwrap_or(f64::NAN)));
            }
            ColumnBuffer::Text(values) => {
                let strings = cast(array, &DataType::Utf8)?;
                values.extend(strings.as_string::<i32>().iter().map(|s| s.map(str::to_string)));
            }
        }
        Ok(())
    }

    fn into_data(self) -> ColumnData {
        match self {
            ColumnBuffer::Int(v) => ColumnData::Int(v),
            ColumnBuffer::Float(v) => ColumnData::Float(v),
            ColumnBuffer::Text(v) if v.iter().all(Option::is_some) => {
                ColumnData::Text(v.into_iter().flatten().collect())
            }
            ColumnBuffer::Text(v) => ColumnData::from_values(
                v.into_iter()
                    .map(|s| s.map_or_else(Value::missing, Value::Text))
                    .collect(),
            ),
        }
    }
}

/// Builds a dataset from record batches sharing `schema`.
///
/// Rows are concatenated in batch order.
pub fn dataset_from_batches(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Dataset> {
    let mut buffers = schema
        .fields()
        .iter()
        .map(|field| kind_of(field).map(ColumnBuffer::new))
        .collect::<Result<Vec<_>>>()?;

    for batch in batches {
        if batch.num_columns() != buffers.len() {
            return Err(GateError::data_source(
                SOURCE_TYPE,
                format!(
                    "batch has {} columns, schema has {}",
                    batch.num_columns(),
                    buffers.len()
                ),
            ));
        }
        for (buffer, array) in buffers.iter_mut().zip(batch.columns()) {
            buffer.append(array)?;
        }
    }

    debug_assert!(buffers.windows(2).all(|w| w[0].len() == w[1].len()));

    let columns = schema
        .fields()
        .iter()
        .zip(buffers)
        .map(|(field, buffer)| Column::new(field.name().clone(), buffer.into_data()))
        .collect();
    Dataset::new(columns)
}

/// Builds a dataset from a single record batch.
pub fn dataset_from_batch(batch: &RecordBatch) -> Result<Dataset> {
    dataset_from_batches(&batch.schema(), std::slice::from_ref(batch))
}

impl Dataset {
    /// Converts the dataset to one record batch.
    ///
    /// `NaN` floats become nulls. Mixed columns are written as text, with
    /// missing cells as nulls.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.column_count());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.column_count());

        for column in self.columns() {
            let (data_type, array): (DataType, ArrayRef) = match column.data() {
                ColumnData::Int(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
                ColumnData::Float(v) => (
                    DataType::Float64,
                    Arc::new(Float64Array::from_iter(
                        v.iter().map(|f| (!f.is_nan()).then_some(*f)),
                    )),
                ),
                ColumnData::Text(v) => (
                    DataType::Utf8,
                    Arc::new(StringArray::from_iter_values(v.iter())),
                ),
                ColumnData::Mixed(v) => (
                    DataType::Utf8,
                    Arc::new(StringArray::from_iter(v.iter().map(|value| match value {
                        _ if value.is_missing() => None,
                        Value::Text(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    }))),
                ),
            };
            fields.push(Field::new(column.name(), data_type, true));
            arrays.push(array);
        }

        let schema = Arc::new(Schema::new(fields));
        if arrays.is_empty() {
            return Ok(RecordBatch::new_empty(schema));
        }
        Ok(RecordBatch::try_new(schema, arrays)?)
    }
}

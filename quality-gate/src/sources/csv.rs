//! CSV ingestion and export through the Arrow CSV reader and writer.
//!
//! Every field is read as text and typed per column over the whole file:
//!
//! | Cells (ignoring empty fields)    | Column                                |
//! |----------------------------------|---------------------------------------|
//! | all integers                     | `Int`, or `Float` when a field is empty |
//! | all numbers                      | `Float`                               |
//! | all text (booleans, dates, ...)  | `Text`, or `Mixed` when a field is empty |
//! | numbers and text                 | `Mixed`                               |
//!
//! Empty fields become missing cells, so a stray value or a gap anywhere in
//! the file is left for the schema validator to report.

use crate::dataset::{Column, Dataset};
use crate::prelude::*;
use arrow::array::AsArray;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

const SOURCE_TYPE: &str = "CSV";

/// Options for reading CSV files.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first line holds column names
    pub has_header: bool,
    /// Field delimiter
    pub delimiter: u8,
    /// Rows per Arrow batch while reading
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            batch_size: 8192,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
    }
}

fn read_error(message: &str, error: ArrowError) -> GateError {
    GateError::data_source_with_source(SOURCE_TYPE, message, Box::new(error))
}

/// Types one raw field. `None` and empty fields are missing.
fn parse_cell(field: Option<&str>) -> Value {
    let Some(text) = field.filter(|t| !t.is_empty()) else {
        return Value::missing();
    };
    if let Ok(int) = text.parse::<i64>() {
        return Value::Int(int);
    }
    // `parse::<f64>` also takes "inf" and "NaN", which are words here.
    if text.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(float) = text.parse::<f64>() {
            return Value::Float(float);
        }
    }
    Value::Text(text.to_string())
}

/// Loads a CSV file into a dataset whose origin is the file path.
///
/// Malformed files (unreadable header, ragged records) are
/// [`GateError::DataSource`] errors naming the path. Cell contents never
/// are: see the module docs for how columns are typed.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Dataset> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    // One record is enough to name the columns of a headerless file.
    let format = options.format();
    let (header, _) = format
        .infer_schema(&mut file, Some(1))
        .map_err(|e| read_error("failed to read header", e))
        .with_context(|| path.display().to_string())?;
    file.seek(SeekFrom::Start(0))?;

    let schema = Arc::new(Schema::new(
        header
            .fields()
            .iter()
            .map(|field| Field::new(field.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(options.batch_size)
        .build(file)?;

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];
    for batch in reader {
        let batch = batch
            .map_err(|e| read_error("failed to read records", e))
            .with_context(|| path.display().to_string())?;
        for (column, array) in cells.iter_mut().zip(batch.columns()) {
            column.extend(array.as_string::<i32>().iter().map(parse_cell));
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(cells)
        .map(|(field, values)| Column::from_values(field.name().clone(), values))
        .collect();
    let dataset = Dataset::new(columns)?;
    debug!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Loaded CSV"
    );
    Ok(dataset.with_origin(path.display().to_string()))
}

/// Writes a dataset to a CSV file with a header row. `NaN` is written as an
/// empty field.
#[instrument(skip_all, fields(path = %path.as_ref().display(), rows = dataset.row_count()))]
pub fn write_csv(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let batch = dataset.to_record_batch()?;
    let file = File::create(path.as_ref())?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch)?;
    Ok(())
}

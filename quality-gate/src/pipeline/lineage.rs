//! Dataset lineage records.
//!
//! Every dataset the gate examines produces one [`LineageRecord`] describing
//! where it came from and what it looked like. Records go to a
//! [`LineageSink`]; the gate treats sink failures as warnings.

use crate::dataset::Dataset;
use crate::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Origin recorded for datasets that were built in memory.
pub const IN_MEMORY_ORIGIN: &str = "memory";

/// Which side of a gate run a dataset was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetRole {
    Reference,
    Current,
}

/// Metadata about one examined dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageRecord {
    pub origin: String,
    pub role: DatasetRole,
    pub timestamp: DateTime<Utc>,
    pub num_rows: usize,
    pub column_names: Vec<String>,
}

impl LineageRecord {
    /// Describes `dataset` as observed now.
    pub fn for_dataset(dataset: &Dataset, role: DatasetRole) -> Self {
        Self::at(dataset, role, Utc::now())
    }

    pub fn at(dataset: &Dataset, role: DatasetRole, timestamp: DateTime<Utc>) -> Self {
        Self {
            origin: dataset.origin().unwrap_or(IN_MEMORY_ORIGIN).to_string(),
            role,
            timestamp,
            num_rows: dataset.row_count(),
            column_names: dataset.column_names().into_iter().map(String::from).collect(),
        }
    }
}

/// Destination for lineage records.
pub trait LineageSink: Send + Sync {
    fn record(&self, record: &LineageRecord) -> Result<()>;
}

/// Appends records to a JSON Lines file, one object per line.
#[derive(Debug, Clone)]
pub struct JsonlLineageLog {
    path: PathBuf,
}

impl JsonlLineageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record written so far. A missing file holds no records.
    pub fn records(&self) -> Result<Vec<LineageRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

impl LineageSink for JsonlLineageLog {
    fn record(&self, record: &LineageRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryLineageLog {
    records: Mutex<Vec<LineageRecord>>,
}

impl MemoryLineageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LineageRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LineageSink for MemoryLineageLog {
    fn record(&self, record: &LineageRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| GateError::Internal("lineage log lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}

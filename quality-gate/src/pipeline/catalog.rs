//! A JSON Lines dataset catalog.

use crate::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use uuid::Uuid;

/// One registered dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub unique_id: Uuid,
    pub dataset_name: String,
    pub description: String,
    pub storage_path: String,
    pub registered_at: DateTime<Utc>,
}

/// Append-only catalog stored as one JSON object per line.
#[derive(Debug, Clone)]
pub struct DataCatalog {
    path: PathBuf,
}

impl DataCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers a dataset under a fresh UUID v4 and returns the entry.
    ///
    /// Names are not required to be unique; each call creates a new entry.
    #[instrument(skip(self, description, location), fields(catalog = %self.path.display()))]
    pub fn register(
        &self,
        name: &str,
        description: &str,
        location: &str,
    ) -> Result<CatalogEntry> {
        if name.trim().is_empty() {
            return Err(GateError::Configuration(
                "dataset name must not be empty".to_string(),
            ));
        }

        let entry = CatalogEntry {
            unique_id: Uuid::new_v4(),
            dataset_name: name.to_string(),
            description: description.to_string(),
            storage_path: location.to_string(),
            registered_at: Utc::now(),
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .write_all(line.as_bytes())?;

        info!(id = %entry.unique_id, "Registered dataset");
        Ok(entry)
    }

    /// All entries in registration order.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        BufReader::new(file)
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|line| -> Result<CatalogEntry> { Ok(serde_json::from_str(&line?)?) })
            .collect()
    }

    /// Entries registered under `name`.
    pub fn find(&self, name: &str) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.dataset_name == name)
            .collect())
    }
}

//! Pipeline collaborators around the gate: file freshness, lineage logging,
//! a dataset catalog, and reproducible sampling.

pub mod catalog;
pub mod freshness;
pub mod lineage;
pub mod sampling;

pub use catalog::{CatalogEntry, DataCatalog};
pub use freshness::{check_freshness, check_freshness_at, FreshnessReport};
pub use lineage::{DatasetRole, JsonlLineageLog, LineageRecord, LineageSink, MemoryLineageLog};
pub use sampling::sample;

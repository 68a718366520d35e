//! Loading datasets from files and Arrow data.
//!
//! The gate itself never touches the file system. These helpers turn CSV
//! files and Arrow record batches into [`Dataset`](crate::dataset::Dataset)s
//! before a run, and write sampled datasets back out.

pub mod arrow;
pub mod csv;

pub use self::arrow::{dataset_from_batch, dataset_from_batches};
pub use self::csv::{load_csv, write_csv, CsvOptions};

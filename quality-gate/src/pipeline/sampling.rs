//! Reproducible row sampling for prototyping against large datasets.

use crate::dataset::Dataset;
use crate::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Seed used when the caller has no preference.
pub const DEFAULT_SEED: u64 = 42;

/// Draws `round(fraction * rows)` rows without replacement.
///
/// The same `(dataset, fraction, seed)` always yields the same rows. Sampled
/// rows keep their original relative order.
///
/// ```rust
/// use quality_gate::dataset::Dataset;
/// use quality_gate::pipeline::sampling::sample;
///
/// let ds = Dataset::builder()
///     .int_column("id", (0..100).collect())
///     .build()
///     .unwrap();
/// let small = sample(&ds, 0.1, 42).unwrap();
/// assert_eq!(small.row_count(), 10);
/// ```
pub fn sample(dataset: &Dataset, fraction: f64, seed: u64) -> Result<Dataset> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(GateError::Configuration(format!(
            "sample fraction must be in [0, 1], got {fraction}"
        )));
    }

    let rows = dataset.row_count();
    let amount = ((fraction * rows as f64).round() as usize).min(rows);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, rows, amount).into_vec();
    picked.sort_unstable();

    debug!(rows, amount, seed, "Sampled dataset");
    Ok(dataset.take_rows(&picked))
}

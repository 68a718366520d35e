//! Example datasets and schemas for tests, doctests and benchmarks.
//!
//! Available under `cfg(test)` or the `test-utils` feature.

use crate::dataset::{Dataset, ValueType};
use crate::schema::{Check, ColumnConstraint, Schema};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Countries accepted by [`employee_schema`].
pub const COUNTRIES: [&str; 5] = ["US", "UK", "IN", "CA", "DE"];

/// `age: int in [0, 120]`, `salary: float >= 0`,
/// `country: text in {US, UK, IN, CA, DE}`.
pub fn employee_schema() -> Schema {
    Schema::builder("employees")
        .column(ColumnConstraint::new("age", ValueType::Int).check(Check::in_range(0.0, 120.0)))
        .column(ColumnConstraint::new("salary", ValueType::Float).check(Check::non_negative()))
        .column(ColumnConstraint::new("country", ValueType::Text).check(Check::is_in(COUNTRIES)))
        .build()
        .expect("employee schema is well formed")
}

/// Three valid employee rows.
pub fn employees() -> Dataset {
    Dataset::builder()
        .int_column("age", vec![30, 45, 25])
        .float_column("salary", vec![50000.0, 75000.0, 60000.0])
        .text_column("country", vec!["US", "UK", "IN"])
        .build()
        .expect("employee fixture is well formed")
}

/// Valid employees whose salaries sit entirely above [`employees`].
pub fn shifted_employees() -> Dataset {
    Dataset::builder()
        .int_column("age", vec![30, 45, 25])
        .float_column("salary", vec![150000.0, 175000.0, 160000.0])
        .text_column("country", vec!["CA", "DE", "US"])
        .build()
        .expect("shifted employee fixture is well formed")
}

/// `feature1 = [10, 15, 12]` and a float feature.
pub fn drift_reference() -> Dataset {
    Dataset::builder()
        .int_column("feature1", vec![10, 15, 12])
        .float_column("feature2", vec![1.5, 2.5, 3.5])
        .build()
        .expect("drift fixture is well formed")
}

/// [`drift_reference`] shifted by a small amount.
pub fn drift_current() -> Dataset {
    Dataset::builder()
        .int_column("feature1", vec![11, 16, 13])
        .float_column("feature2", vec![1.6, 2.4, 3.6])
        .build()
        .expect("drift fixture is well formed")
}

/// `columns` float columns of `rows` standard-uniform values scaled to
/// `[offset, offset + 100)`, reproducible per seed.
pub fn uniform_features(columns: usize, rows: usize, offset: f64, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = Dataset::builder();
    for c in 0..columns {
        let values = (0..rows)
            .map(|_| offset + rng.random::<f64>() * 100.0)
            .collect();
        builder = builder.float_column(format!("feature{c}"), values);
    }
    builder.build().expect("generated features are well formed")
}

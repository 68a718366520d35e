//! File freshness checks.

use crate::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Default maximum file age.
pub const DEFAULT_MAX_AGE_HOURS: f64 = 24.0;

/// Age of a file relative to a maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessReport {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub age_hours: f64,
    pub max_age_hours: f64,
    pub is_fresh: bool,
}

impl FreshnessReport {
    pub fn is_stale(&self) -> bool {
        !self.is_fresh
    }
}

/// Checks `path` against `max_age_hours` using the current time.
pub fn check_freshness(path: impl AsRef<Path>, max_age_hours: f64) -> Result<FreshnessReport> {
    check_freshness_at(path, max_age_hours, Utc::now())
}

/// Checks `path` against `max_age_hours` as of `now`.
///
/// A file is fresh when its age does not exceed the maximum. Modification
/// times in the future count as age zero.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn check_freshness_at(
    path: impl AsRef<Path>,
    max_age_hours: f64,
    now: DateTime<Utc>,
) -> Result<FreshnessReport> {
    if !(max_age_hours >= 0.0) {
        return Err(GateError::Configuration(format!(
            "max_age_hours must be non-negative, got {max_age_hours}"
        )));
    }

    let path = path.as_ref();
    let modified: DateTime<Utc> = std::fs::metadata(path)?.modified()?.into();
    let age_seconds = (now - modified).num_milliseconds().max(0) as f64 / 1000.0;
    let age_hours = age_seconds / 3600.0;
    let is_fresh = age_hours <= max_age_hours;

    if is_fresh {
        info!(age_hours, max_age_hours, "File is fresh");
    } else {
        warn!(age_hours, max_age_hours, "File may be stale");
    }

    Ok(FreshnessReport {
        path: path.to_path_buf(),
        modified,
        age_hours,
        max_age_hours,
        is_fresh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_file_is_fresh() {
        let file = NamedTempFile::new().unwrap();
        let report = check_freshness(file.path(), DEFAULT_MAX_AGE_HOURS).unwrap();
        assert!(report.is_fresh);
        assert!(report.age_hours < 1.0);
    }

    #[test]
    fn test_stale_when_checked_later() {
        let file = NamedTempFile::new().unwrap();
        let later = Utc::now() + Duration::hours(30);
        let report = check_freshness_at(file.path(), 24.0, later).unwrap();
        assert!(report.is_stale());
        assert!(report.age_hours > 29.0);
    }

    #[test]
    fn test_future_mtime_counts_as_zero_age() {
        let file = NamedTempFile::new().unwrap();
        let earlier = Utc::now() - Duration::hours(5);
        let report = check_freshness_at(file.path(), 0.0, earlier).unwrap();
        assert_eq!(report.age_hours, 0.0);
        assert!(report.is_fresh);
    }

    #[test]
    fn test_missing_file() {
        let err = check_freshness("/definitely/not/here.csv", 24.0).unwrap_err();
        assert!(matches!(err, GateError::Io(_)));
    }

    #[test]
    fn test_negative_max_age_rejected() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            check_freshness(file.path(), -1.0),
            Err(GateError::Configuration(_))
        ));
    }
}

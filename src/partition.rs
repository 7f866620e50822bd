use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{LakeError, Result};
use crate::schema::layout;

/// One ISO week of trips: the unit of parallel work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub year: i32,
    pub week: u32,
    /// Data file of this week in the input dataset.
    pub path: PathBuf,
}

impl Partition {
    /// Describe the partition of `root` for (year, week).
    pub fn in_root(root: &Path, year: i32, week: u32) -> Self {
        Self {
            year,
            week,
            path: data_file(root, year, week),
        }
    }

    /// Where the cleaned copy of this partition lives under `output_root`.
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        data_file(output_root, self.year, self.week)
    }

    pub fn key(&self) -> (i32, u32) {
        (self.year, self.week)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// `<root>/iso_year=<Y>/iso_week=<W>`
pub fn partition_dir(root: &Path, year: i32, week: u32) -> PathBuf {
    root.join(format!("{}={}", layout::YEAR_KEY, year))
        .join(format!("{}={}", layout::WEEK_KEY, week))
}

/// `<root>/iso_year=<Y>/iso_week=<W>/data-0.parquet`
pub fn data_file(root: &Path, year: i32, week: u32) -> PathBuf {
    partition_dir(root, year, week).join(layout::DATA_FILE)
}

/// Parse a Hive directory name `key=value`.
///
/// `Ok(None)` when the name is for another key; an error when the key matches
/// but the value is not an integer.
pub fn parse_hive_segment<T: std::str::FromStr>(dir: &Path, key: &str) -> Result<Option<T>> {
    let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let Some(value) = name.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')) else {
        return Ok(None);
    };
    value.parse::<T>().map(Some).map_err(|_| {
        LakeError::Discovery(format!(
            "invalid {key} value '{value}' in {}",
            dir.display()
        ))
    })
}

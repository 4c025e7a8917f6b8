//! Source series loading
//!
//! Each series (total, female, male) is a CSV file with a `year` and an
//! `age` column. Rows with a missing or unparseable field are logged and
//! skipped. The three series are then joined by year into `YearRecord`s in
//! the order of the total series; a year missing from the female or male
//! series is logged and skipped.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};
use types::record::{Year, YearRecord};

use crate::config::EmitterConfig;

pub const COLUMN_YEAR: &str = "year";
pub const COLUMN_AGE: &str = "age";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Missing column '{column}' in header of {path}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("No header line in {path}")]
    EmptyFile { path: PathBuf },
}

/// One parsed row of a single series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRow {
    pub year: Year,
    pub age: f64,
}

/// Parse CSV text for one series.
///
/// `path` is used for error messages only.
pub fn parse_series(path: &Path, text: &str) -> Result<Vec<SeriesRow>, SourceError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or_else(|| SourceError::EmptyFile {
        path: path.to_path_buf(),
    })?;
    let columns: Vec<String> = split_fields(header)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let column_index = |column: &'static str| {
        columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| SourceError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
    };
    let year_idx = column_index(COLUMN_YEAR)?;
    let age_idx = column_index(COLUMN_AGE)?;

    let mut rows = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = split_fields(line).collect();

        let year = fields.get(year_idx).and_then(|f| f.parse::<Year>().ok());
        let age = fields
            .get(age_idx)
            .and_then(|f| f.parse::<f64>().ok())
            .filter(|a| a.is_finite());

        match (year, age) {
            (Some(year), Some(age)) => rows.push(SeriesRow { year, age }),
            _ => {
                error!(
                    path = %path.display(),
                    row = line_no + 1,
                    line,
                    "Missing or invalid 'year' or 'age', skipping row"
                );
            }
        }
    }

    Ok(rows)
}

/// Read and parse one series file.
pub fn load_series(path: &Path) -> Result<Vec<SeriesRow>, SourceError> {
    info!(path = %path.display(), "Opening data file");
    let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_series(path, &text)
}

/// Join three series into records by year.
///
/// Follows the order of `total`. Years absent from `female` or `male` are
/// skipped; a repeated year keeps its first row.
pub fn join_series(
    total: &[SeriesRow],
    female: &[SeriesRow],
    male: &[SeriesRow],
) -> Vec<YearRecord> {
    let female = index_by_year("female", female);
    let male = index_by_year("male", male);

    let records: Vec<YearRecord> = total
        .iter()
        .filter_map(|t| match (female.get(&t.year), male.get(&t.year)) {
            (Some(&f), Some(&m)) => Some(YearRecord::new(t.year, t.age, f, m)),
            (f, m) => {
                error!(
                    year = t.year,
                    female = f.is_some(),
                    male = m.is_some(),
                    "Year missing from a series, skipping"
                );
                None
            }
        })
        .collect();

    if records.len() != total.len() || female.len() != male.len() {
        warn!(
            total = total.len(),
            female = female.len(),
            male = male.len(),
            joined = records.len(),
            "Series cover different years"
        );
    }
    records
}

fn index_by_year(series: &'static str, rows: &[SeriesRow]) -> BTreeMap<Year, f64> {
    let mut by_year = BTreeMap::new();
    for row in rows {
        if by_year.contains_key(&row.year) {
            warn!(series, year = row.year, "Repeated year, keeping first row");
            continue;
        }
        by_year.insert(row.year, row.age);
    }
    by_year
}

/// Load all three configured series and join them into records.
pub fn load_records(config: &EmitterConfig) -> Result<Vec<YearRecord>, SourceError> {
    let total = load_series(&config.total_path())?;
    let female = load_series(&config.female_path())?;
    let male = load_series(&config.male_path())?;

    let records = join_series(&total, &female, &male);
    info!(records = records.len(), "Source series loaded");
    Ok(records)
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|f| f.trim().trim_matches('"'))
}

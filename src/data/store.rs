//! Data Store Module
//! Handles loading of the backing COVID-19 CSV file using Polars.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Date format used by the backing file (`31/12/2024`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

const DATE_COLUMN: &str = "Data";
const COUNTRY_COLUMN: &str = "País";
const CASES_TOTAL_COLUMN: &str = "casosAcumulados";
const CASES_NEW_COLUMN: &str = "casosNovos";
const DEATHS_TOTAL_COLUMN: &str = "obitosAcumulados";
const DEATHS_NEW_COLUMN: &str = "obitosNovos";

#[derive(Error, Debug)]
#[error("backing data file path is missing or empty")]
pub struct ConfigError;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("row {row}: invalid date '{value}' (expected DD/MM/YYYY)")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: &'static str },
}

/// One row of the dataset.
///
/// Wire names match the backing file's column headers; `date` is parsed
/// from `DD/MM/YYYY` and serialized as an ISO date. A blank cell in a
/// numeric column is kept as `None` (JSON `null`) and excluded per field
/// from aggregates; it does not invalidate the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovidRecord {
    #[serde(rename = "País")]
    pub country: String,
    #[serde(rename = "Data")]
    pub date: NaiveDate,
    #[serde(rename = "casosAcumulados")]
    pub cumulative_cases: Option<i64>,
    #[serde(rename = "casosNovos")]
    pub new_cases: Option<i64>,
    #[serde(rename = "obitosAcumulados")]
    pub cumulative_deaths: Option<i64>,
    #[serde(rename = "obitosNovos")]
    pub new_deaths: Option<i64>,
}

/// The four numeric columns that statistics and charts operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    CumulativeCases,
    NewCases,
    CumulativeDeaths,
    NewDeaths,
}

impl NumericField {
    pub const ALL: [NumericField; 4] = [
        NumericField::CumulativeCases,
        NumericField::NewCases,
        NumericField::CumulativeDeaths,
        NumericField::NewDeaths,
    ];

    /// Column name in the backing file and on the wire.
    pub fn column_name(self) -> &'static str {
        match self {
            NumericField::CumulativeCases => CASES_TOTAL_COLUMN,
            NumericField::NewCases => CASES_NEW_COLUMN,
            NumericField::CumulativeDeaths => DEATHS_TOTAL_COLUMN,
            NumericField::NewDeaths => DEATHS_NEW_COLUMN,
        }
    }

    /// Display label for chart titles and panel headers.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::CumulativeCases => "Casos acumulados",
            NumericField::NewCases => "Casos novos",
            NumericField::CumulativeDeaths => "Óbitos acumulados",
            NumericField::NewDeaths => "Óbitos novos",
        }
    }

    /// The record's value for this column, `None` when the cell was blank.
    pub fn value(self, record: &CovidRecord) -> Option<f64> {
        match self {
            NumericField::CumulativeCases => record.cumulative_cases.map(|v| v as f64),
            NumericField::NewCases => record.new_cases.map(|v| v as f64),
            NumericField::CumulativeDeaths => record.cumulative_deaths.map(|v| v as f64),
            NumericField::NewDeaths => record.new_deaths.map(|v| v as f64),
        }
    }
}

/// Produces the current dataset on demand.
///
/// The store owns only the configured path: every `load` re-reads the
/// backing file, so callers always see its current on-disk contents. This
/// reload-on-access policy is deliberate (freshness over load latency) and
/// no caching may be layered on top of it.
#[derive(Debug, Clone)]
pub struct DataStore {
    file_path: PathBuf,
}

impl DataStore {
    /// Configure the store. An empty path is rejected here rather than on
    /// first load.
    pub fn new(file_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let file_path = file_path.into();
        if file_path.as_os_str().is_empty() {
            return Err(ConfigError);
        }
        Ok(Self { file_path })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Read the backing file and materialize every row.
    ///
    /// Returns a fresh, independently owned dataset on every call; two
    /// calls may differ if the file was edited in between. Any row with a
    /// missing or unparseable date fails the whole load; blank numeric
    /// cells are kept as absent values.
    pub fn load(&self) -> Result<Vec<CovidRecord>, LoadError> {
        let path = self.file_path.to_string_lossy();

        let df = LazyCsvReader::new(path.as_ref())
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let date_col = df.column(DATE_COLUMN)?.cast(&DataType::String)?;
        let dates = date_col.as_materialized_series().str()?;
        let country_col = df.column(COUNTRY_COLUMN)?.cast(&DataType::String)?;
        let countries = country_col.as_materialized_series().str()?;
        let cases_total_col = df.column(CASES_TOTAL_COLUMN)?.cast(&DataType::Int64)?;
        let cases_total = cases_total_col.as_materialized_series().i64()?;
        let cases_new_col = df.column(CASES_NEW_COLUMN)?.cast(&DataType::Int64)?;
        let cases_new = cases_new_col.as_materialized_series().i64()?;
        let deaths_total_col = df.column(DEATHS_TOTAL_COLUMN)?.cast(&DataType::Int64)?;
        let deaths_total = deaths_total_col.as_materialized_series().i64()?;
        let deaths_new_col = df.column(DEATHS_NEW_COLUMN)?.cast(&DataType::Int64)?;
        let deaths_new = deaths_new_col.as_materialized_series().i64()?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let raw_date = dates.get(row).ok_or(LoadError::MissingValue {
                row,
                column: DATE_COLUMN,
            })?;
            let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
                LoadError::InvalidDate {
                    row,
                    value: raw_date.to_string(),
                }
            })?;

            records.push(CovidRecord {
                country: countries
                    .get(row)
                    .ok_or(LoadError::MissingValue {
                        row,
                        column: COUNTRY_COLUMN,
                    })?
                    .to_string(),
                date,
                cumulative_cases: cases_total.get(row),
                new_cases: cases_new.get(row),
                cumulative_deaths: deaths_total.get(row),
                new_deaths: deaths_new.get(row),
            });
        }

        debug!(rows = records.len(), "dataset loaded");
        Ok(records)
    }
}

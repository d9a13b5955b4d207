//! Statistics Calculator Module
//! Descriptive statistics over the numeric dataset columns.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{DataStore, LoadError, NumericField};

/// Summary statistics for a single numeric column.
///
/// Degenerate inputs use a NaN sentinel rather than an error: `mean` and
/// `median` are NaN for an empty dataset, and `std` (sample estimator,
/// N-1 denominator) is NaN below two values. NaN serializes to JSON null.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Column name -> summary, one entry per numeric column.
pub type StatisticsSnapshot = BTreeMap<String, FieldSummary>;

/// Compute mean, median and sample standard deviation for a set of values.
pub(crate) fn summarize(values: &[f64]) -> FieldSummary {
    let n = values.len();
    if n == 0 {
        return FieldSummary {
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let std = if n > 1 {
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    FieldSummary { mean, median, std }
}

/// Computes statistics snapshots from the freshest on-disk data.
#[derive(Debug, Clone)]
pub struct StatsService {
    store: DataStore,
}

impl StatsService {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Compute a fresh snapshot over the four numeric columns.
    ///
    /// Every call reloads the backing file via `DataStore::load`, so the
    /// snapshot always reflects the file's current contents. Absent cells
    /// are excluded from their column's aggregates; the remaining rows
    /// still count for the other columns. Load failures propagate
    /// unchanged; degenerate statistics do not fail (NaN sentinel, see
    /// [`FieldSummary`]).
    pub fn basic_statistics(&self) -> Result<StatisticsSnapshot, LoadError> {
        let records = self.store.load()?;

        Ok(NumericField::ALL
            .par_iter()
            .map(|&field| {
                let values: Vec<f64> = records.iter().filter_map(|r| field.value(r)).collect();
                (field.column_name().to_string(), summarize(&values))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::statistics::Statistics;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Data,País,casosAcumulados,casosNovos,obitosAcumulados,obitosNovos";

    fn service_over(rows: &[&str]) -> (StatsService, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();

        let store = DataStore::new(file.path()).unwrap();
        (StatsService::new(store), file)
    }

    #[test]
    fn median_of_odd_count_is_middle_value() {
        assert_eq!(summarize(&[10.0, 20.0, 30.0]).median, 20.0);
    }

    #[test]
    fn median_of_even_count_averages_central_values() {
        assert_eq!(summarize(&[10.0, 20.0, 30.0, 40.0]).median, 25.0);
    }

    #[test]
    fn median_ignores_input_order() {
        assert_eq!(summarize(&[30.0, 10.0, 20.0]).median, 20.0);
    }

    #[test]
    fn std_matches_reference_sample_estimator() {
        let values = vec![12.0, 17.5, 3.25, 99.0, 41.0, 41.0, 0.5];

        let reference: f64 = values.iter().std_dev();
        let computed = summarize(&values).std;

        assert!((computed - reference).abs() / reference < 1e-9);
    }

    #[test]
    fn empty_input_yields_nan_sentinels() {
        let summary = summarize(&[]);
        assert!(summary.mean.is_nan());
        assert!(summary.median.is_nan());
        assert!(summary.std.is_nan());
    }

    #[test]
    fn single_value_has_defined_mean_but_nan_std() {
        let summary = summarize(&[42.0]);
        assert_eq!(summary.mean, 42.0);
        assert_eq!(summary.median, 42.0);
        assert!(summary.std.is_nan());
    }

    #[test]
    fn snapshot_covers_all_four_columns() {
        let (service, _file) = service_over(&[
            "01/07/2024,Brasil,100,10,5,1",
            "02/07/2024,Brasil,120,20,7,2",
            "03/07/2024,Brasil,150,30,10,3",
        ]);

        let snapshot = service.basic_statistics().unwrap();

        let columns: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(
            columns,
            vec![
                "casosAcumulados",
                "casosNovos",
                "obitosAcumulados",
                "obitosNovos"
            ]
        );

        let new_cases = &snapshot["casosNovos"];
        assert_eq!(new_cases.mean, 20.0);
        assert_eq!(new_cases.median, 20.0);
        assert!((new_cases.std - 10.0).abs() < 1e-9);
    }

    #[test]
    fn absent_cells_are_excluded_from_their_column_only() {
        let (service, _file) = service_over(&[
            "01/07/2024,Brasil,100,10,5,1",
            "02/07/2024,Brasil,120,,7,2",
            "03/07/2024,Brasil,150,30,10,3",
        ]);

        let snapshot = service.basic_statistics().unwrap();

        // casosNovos aggregates over the two present values.
        let new_cases = &snapshot["casosNovos"];
        assert_eq!(new_cases.mean, 20.0);
        assert_eq!(new_cases.median, 20.0);

        // The row itself still counts for the other columns.
        assert_eq!(snapshot["casosAcumulados"].median, 120.0);
    }

    #[test]
    fn snapshot_is_recomputed_from_the_file_on_every_call() {
        let (service, file) = service_over(&[
            "01/07/2024,Brasil,100,10,5,1",
            "02/07/2024,Brasil,120,20,7,2",
        ]);

        let before = service.basic_statistics().unwrap()["casosNovos"].mean;

        std::fs::write(
            file.path(),
            format!("{HEADER}\n01/07/2024,Brasil,100,50,5,1\n02/07/2024,Brasil,120,70,7,2\n"),
        )
        .unwrap();

        let after = service.basic_statistics().unwrap()["casosNovos"].mean;

        assert_eq!(before, 15.0);
        assert_eq!(after, 60.0);
    }

    #[test]
    fn load_failures_propagate_unchanged() {
        let store = DataStore::new("/no/such/file.csv").unwrap();
        let service = StatsService::new(store);
        assert!(matches!(
            service.basic_statistics().unwrap_err(),
            LoadError::Csv(_)
        ));
    }
}

//! Chart Plotter Module
//! Renders static PNG charts from the dataset using plotters.

use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::{CovidRecord, NumericField};

const CHART_SIZE: (u32, u32) = (1000, 600);
const CASES_COLOR: RGBColor = RGBColor(52, 120, 219);
const DEATHS_COLOR: RGBColor = RGBColor(217, 62, 52);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("no rows to plot")]
    EmptyDataset,
    #[error("no rows for country '{0}'")]
    UnknownCountry(String),
    #[error("chart rendering failed: {0}")]
    Render(String),
}

fn render_err(err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(err.to_string())
}

fn date_span(points: &[(NaiveDate, f64)]) -> (NaiveDate, NaiveDate) {
    let mut start = points[0].0;
    let mut end = points[0].0;
    for &(date, _) in points {
        start = start.min(date);
        end = end.max(date);
    }
    // A single-day span still needs a non-empty axis.
    if start == end {
        end = end.succ_opt().unwrap_or(end);
    }
    (start, end)
}

fn sorted_points(
    records: &[CovidRecord],
    field: NumericField,
    country: Option<&str>,
) -> Vec<(NaiveDate, f64)> {
    let mut points: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter(|r| country.map_or(true, |c| r.country == c))
        .filter_map(|r| field.value(r).map(|v| (r.date, v)))
        .collect();
    points.sort_by_key(|&(date, _)| date);
    points
}

/// Bin boundaries and counts for a histogram, `(start, end, count)` per bin.
pub(crate) fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min + i as f64 * width, min + (i + 1) as f64 * width, count))
        .collect()
}

/// Area chart of daily new cases vs new deaths over time.
pub fn render_daily_area(records: &[CovidRecord], path: &Path) -> Result<(), ChartError> {
    let cases = sorted_points(records, NumericField::NewCases, None);
    let deaths = sorted_points(records, NumericField::NewDeaths, None);

    let span_points: Vec<(NaiveDate, f64)> = cases.iter().chain(deaths.iter()).copied().collect();
    if span_points.is_empty() {
        return Err(ChartError::EmptyDataset);
    }
    let (start, end) = date_span(&span_points);

    let y_min = cases
        .iter()
        .chain(deaths.iter())
        .map(|&(_, v)| v)
        .fold(0.0, f64::min);
    let y_max = cases
        .iter()
        .chain(deaths.iter())
        .map(|&(_, v)| v)
        .fold(1.0, f64::max);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Casos novos x Óbitos novos", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(80)
        .build_cartesian_2d(start..end, y_min..y_max * 1.1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|date: &NaiveDate| date.format("%d-%m-%Y").to_string())
        .y_desc("Quantidade")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(AreaSeries::new(
            cases.iter().copied(),
            0.0,
            CASES_COLOR.mix(0.5),
        ))
        .map_err(render_err)?
        .label("Casos novos")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], CASES_COLOR.filled()));

    chart
        .draw_series(AreaSeries::new(
            deaths.iter().copied(),
            0.0,
            DEATHS_COLOR.mix(0.5),
        ))
        .map_err(render_err)?
        .label("Óbitos novos")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], DEATHS_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Line chart of one column's evolution over time for a single country.
pub fn render_country_trend(
    records: &[CovidRecord],
    country: &str,
    field: NumericField,
    path: &Path,
) -> Result<(), ChartError> {
    let points = sorted_points(records, field, Some(country));
    if points.is_empty() {
        return Err(ChartError::UnknownCountry(country.to_string()));
    }

    let (start, end) = date_span(&points);
    let y_max = points.iter().map(|&(_, v)| v).fold(1.0, f64::max);
    let color = match field {
        NumericField::CumulativeDeaths | NumericField::NewDeaths => DEATHS_COLOR,
        _ => CASES_COLOR,
    };

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Evolução de {} — {}", field.label(), country),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(80)
        .build_cartesian_2d(start..end, 0.0..y_max * 1.1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|date: &NaiveDate| date.format("%d-%m-%Y").to_string())
        .y_desc(field.label())
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &color).point_size(3))
        .map_err(render_err)?
        .label(country)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], color));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Histogram of one numeric column's value distribution.
pub fn render_histogram(
    records: &[CovidRecord],
    field: NumericField,
    bins: usize,
    path: &Path,
) -> Result<(), ChartError> {
    let values: Vec<f64> = records.iter().filter_map(|r| field.value(r)).collect();
    if values.is_empty() {
        return Err(ChartError::EmptyDataset);
    }

    let buckets = histogram_bins(&values, bins);

    let x_min = buckets.first().map(|&(start, _, _)| start).unwrap_or(0.0);
    let x_max = buckets.last().map(|&(_, end, _)| end).unwrap_or(1.0);
    let y_max = buckets
        .iter()
        .map(|&(_, _, count)| count as f64)
        .fold(1.0, f64::max);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Histograma de {}", field.label()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .y_desc("Frequência")
        .x_desc(field.label())
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(buckets.iter().map(|&(start, end, count)| {
            Rectangle::new(
                [(start, 0.0), (end, count as f64)],
                CASES_COLOR.mix(0.6).filled(),
            )
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_bins_cover_the_value_range() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0];
        let buckets = histogram_bins(&values, 5);

        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].0, 0.0);
        assert_eq!(buckets[4].1, 5.0);
        assert_eq!(buckets.iter().map(|&(_, _, c)| c).sum::<usize>(), values.len());
        // The maximum value lands in the last bin, not past it.
        assert_eq!(buckets[4].2, 4);
    }

    #[test]
    fn histogram_of_constant_values_gets_a_widened_range() {
        let buckets = histogram_bins(&[7.0, 7.0, 7.0], 3);
        assert_eq!(buckets.len(), 3);
        assert!(buckets[0].0 < 7.0 && buckets[2].1 > 7.0);
        assert_eq!(buckets.iter().map(|&(_, _, c)| c).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_of_empty_input_is_empty() {
        assert!(histogram_bins(&[], 10).is_empty());
    }

    #[test]
    fn single_day_span_is_widened_to_a_non_empty_axis() {
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let (start, end) = date_span(&[(day, 1.0), (day, 2.0)]);
        assert!(start < end);
    }

    fn sample_records() -> Vec<CovidRecord> {
        (1..=5)
            .map(|day| CovidRecord {
                country: "Brasil".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
                cumulative_cases: Some(100 + day as i64 * 10),
                new_cases: Some(day as i64 * 2),
                cumulative_deaths: Some(5 + day as i64),
                new_deaths: Some(1),
            })
            .collect()
    }

    #[test]
    fn trend_for_unknown_country_is_an_error() {
        let err = render_country_trend(
            &sample_records(),
            "Atlântida",
            NumericField::CumulativeCases,
            Path::new("/tmp/unused.png"),
        )
        .unwrap_err();

        assert!(matches!(err, ChartError::UnknownCountry(_)));
    }

    #[test]
    fn area_chart_writes_a_non_empty_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area.png");

        render_daily_area(&sample_records(), &path).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn trend_chart_writes_a_non_empty_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.png");

        render_country_trend(
            &sample_records(),
            "Brasil",
            NumericField::CumulativeCases,
            &path,
        )
        .unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn histogram_writes_a_non_empty_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("histogram.png");

        render_histogram(&sample_records(), NumericField::NewCases, 10, &path).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
